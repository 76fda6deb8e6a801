pub(crate) const DEFAULT_USER_AGENT: &str = concat!("simple-http-st/", env!("CARGO_PKG_VERSION"));
