pub mod publish_request;
pub mod search;

pub use publish_request::{parse_tags, PublishRequest, MAX_CONTENT_CHARS, MAX_TITLE_CHARS};
pub use search::{
    ImageResult, NewsResult, OrganicResult, SearchKind, SearchRequest, SearchResponse, TimeRange,
    VideoResult,
};
