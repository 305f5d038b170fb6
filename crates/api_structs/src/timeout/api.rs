use serde::{Deserialize, Serialize};

pub mod run_timeout_scan {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub exit_code: i32,
        pub output: String,
        pub notified: usize,
        pub skipped: usize,
        pub errors: usize,
    }
}
