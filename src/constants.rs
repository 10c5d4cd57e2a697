pub mod notices {

    pub const SUBSCRIPTION_REQUIRED: &str =
        "A subscription is required to use the code generator. Subscribe for 199₽.";

    pub const LOGIN_REQUIRED: &str = "Please log in before sending a request.";

    pub const REQUEST_IN_FLIGHT: &str =
        "A snippet is still being generated. Wait for it to finish before sending another request.";

    pub const ADMIN_ONLY: &str = "Only administrators can manage subscriptions.";

    /// Assistant message content used when the generator fails.
    pub const GENERATION_FAILED: &str =
        "Sorry, the code could not be generated right now. Please try again.";
}

pub mod subscriptions {

    pub const DEFAULT_DURATION_DAYS: i64 = 30;

    /// Upper bound for a configured subscription lifetime (ten years).
    pub const MAX_DURATION_DAYS: i64 = 3650;

    pub const PRICE_RUB: u32 = 199;
}

pub mod defaults {

    pub const DISPLAY_NAME: &str = "User";

    pub const USER_AGENT: &str = "CodegenGate/1.0";

    pub const ADMIN_EMAIL: &str = "admin@codegen.ai";
}

pub mod intervals {
    use std::time::Duration;

    pub const MOCK_GENERATION_DELAY: Duration = Duration::from_millis(1000);

    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
}

pub mod limits {

    pub const EVENT_BUS_BUFFER: usize = 64;
}
