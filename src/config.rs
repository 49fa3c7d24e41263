//! Configuration for faqdesk
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

use crate::auth::{JwtValidator, DEFAULT_EXPIRY_SECONDS};
use crate::types::Result;

/// faqdesk - company FAQ knowledge base
#[derive(Parser, Debug, Clone)]
#[command(name = "faqdesk")]
#[command(about = "Company FAQ knowledge base with cookie-session auth")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Development mode: fixed JWT secret, insecure cookies, in-memory
    /// fallback when MongoDB is unreachable
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "faqdesk")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds; also the session cookie's Max-Age
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value_t = DEFAULT_EXPIRY_SECONDS)]
    pub jwt_expiry_seconds: u64,

    /// Honor `role: "admin"` in signup requests
    #[arg(long, env = "ALLOW_ADMIN_SIGNUP", default_value = "false")]
    pub allow_admin_signup: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Session cookies carry `Secure` outside dev mode
    pub fn secure_cookies(&self) -> bool {
        !self.dev_mode
    }

    /// Token service for this configuration (fixed dev secret if none is set in dev mode)
    pub fn jwt_validator(&self) -> Result<JwtValidator> {
        match (&self.jwt_secret, self.dev_mode) {
            (None, true) => Ok(JwtValidator::new_dev(self.jwt_expiry_seconds)),
            (secret, _) => {
                JwtValidator::new(secret.clone().unwrap_or_default(), self.jwt_expiry_seconds)
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.dev_mode {
            match self.jwt_secret.as_deref() {
                None | Some("") => {
                    return Err("JWT_SECRET is required in production mode".to_string());
                }
                Some(secret) if secret.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string());
                }
                Some(_) => {}
            }
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("faqdesk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 3000);
        assert_eq!(args.mongodb_db, "faqdesk");
        assert_eq!(args.jwt_expiry_seconds, DEFAULT_EXPIRY_SECONDS);
        assert!(!args.allow_admin_signup);
        assert!(!args.secure_cookies());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let args = Args {
            dev_mode: false,
            jwt_secret: None,
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().is_err());

        let short = Args {
            jwt_secret: Some("too-short".into()),
            ..args.clone()
        };
        assert!(short.validate().is_err());

        let good = Args {
            jwt_secret: Some("a-production-secret-of-at-least-32-chars".into()),
            ..args
        };
        assert!(good.validate().is_ok());
        assert!(good.secure_cookies());
    }

    #[test]
    fn test_dev_mode_falls_back_to_dev_secret() {
        let args = parse(&["--dev-mode"]);
        let args = Args { jwt_secret: None, ..args };
        assert!(args.jwt_validator().is_ok());

        let prod = Args { dev_mode: false, ..args };
        assert!(prod.jwt_validator().is_err());
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let args = Args {
            jwt_expiry_seconds: 0,
            ..parse(&["--dev-mode"])
        };
        assert!(args.validate().is_err());
    }
}
