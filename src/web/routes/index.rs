use log::debug;

pub const INDEX_TEXT: &str = "You shouldn't be here go away";

pub async fn page() -> &'static str {
    debug!("[web] GET /");
    INDEX_TEXT
}
