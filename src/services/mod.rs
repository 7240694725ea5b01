pub mod short_code;
pub mod url_service;

pub use short_code::SlugGenerator;
pub use url_service::UrlService;
