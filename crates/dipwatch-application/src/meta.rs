pub fn app_name() -> &'static str {
    "dipwatch"
}

pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
