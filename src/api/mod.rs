pub mod v1;

use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Everything served under `/api`, with rejections rendered as JSON envelopes.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    warp::path("api")
        .and(v1::routes(server))
        .recover(v1::recover_error)
        .with(warp::trace::request())
}
