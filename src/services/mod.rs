pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::{HttpAuthService, LocalAuthService};

pub mod subscription_service;
pub mod subscription_service_impl;
pub use subscription_service::{SubscriptionOpError, SubscriptionRegistry};
pub use subscription_service_impl::{HttpSubscriptionRegistry, LocalSubscriptionRegistry};

pub mod generation_service;
pub mod generation_service_impl;
pub use generation_service::{CodeGenerator, GenerationError};
pub use generation_service_impl::{HttpCodeGenerator, MockCodeGenerator, render_mock_snippet};
