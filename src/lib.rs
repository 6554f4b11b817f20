// Library root
// -----------
// This crate exposes a small library surface for the archiver CLI. The
// binary (`main.rs`) wires these modules together in a single linear run.
//
// Module responsibilities:
// - `cli`: Command-line arguments and the resolved run configuration.
// - `api`: Encapsulates HTTP interactions (channel search, auth, archive
//   submission) and the wire types they exchange.
// - `fetch`: Walks the paginated search results and collects video links.
// - `submit`: Shuffles the links, forwards them to the archive server and
//   reports the ones that failed.
//
// The HTTP client sits behind small traits so `fetch` and `submit` can be
// exercised in tests without a network.
pub mod api;
pub mod cli;
pub mod fetch;
pub mod submit;
