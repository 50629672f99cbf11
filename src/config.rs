use std::{env, path::PathBuf, time::Duration};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseSource {
    /// Course content lives in the store; the catalog file seeds it once.
    Database,
    /// Course content is served straight from the catalog file.
    Json,
}

impl CourseSource {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" | "file" => CourseSource::Json,
            _ => CourseSource::Database,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraderConfig {
    pub compile_command: Vec<String>,
    pub run_command: Vec<String>,
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub work_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub session_expiration_hours: i64,
    pub session_cookie_secure: bool,
    pub cors_allowed_origin: String,
    pub course_source: CourseSource,
    pub course_catalog_path: PathBuf,
    pub grader: GraderConfig,
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "nexium-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5064),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            ),
            session_expiration_hours: env::var("SESSION_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            session_cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            course_source: env::var("COURSE_SOURCE")
                .map(|v| CourseSource::parse(&v))
                .unwrap_or(CourseSource::Database),
            course_catalog_path: env::var("COURSE_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/csharp_course.json")),
            grader: GraderConfig {
                compile_command: split_command(
                    &env::var("GRADER_COMPILE_CMD")
                        .unwrap_or_else(|_| "mcs -out:{output} {source}".to_string()),
                ),
                run_command: split_command(
                    &env::var("GRADER_RUN_CMD").unwrap_or_else(|_| "mono {output}".to_string()),
                ),
                timeout: Duration::from_secs(
                    env::var("GRADER_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(10),
                ),
                max_output_bytes: env::var("GRADER_MAX_OUTPUT_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(64 * 1024),
                work_dir: env::var("GRADER_WORK_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir().join("nexium-grader")),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Rejects configurations that still carry development defaults.
    pub fn validate_for_production(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the default value. Set JWT_SECRET to a secure random string."
                    .to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}). Must be at least 32 characters.",
                jwt_secret.len()
            )));
        }

        if !self.session_cookie_secure {
            return Err(AppError::InternalError(
                "SESSION_COOKIE_SECURE must be enabled in production.".to_string(),
            ));
        }

        if self.grader.compile_command.is_empty() || self.grader.run_command.is_empty() {
            return Err(AppError::InternalError(
                "GRADER_COMPILE_CMD and GRADER_RUN_CMD must not be empty.".to_string(),
            ));
        }

        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "nexium-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5064,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            session_expiration_hours: 1,
            session_cookie_secure: false,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            course_source: CourseSource::Json,
            course_catalog_path: PathBuf::from("data/csharp_course.json"),
            grader: GraderConfig {
                compile_command: split_command("mcs -out:{output} {source}"),
                run_command: split_command("mono {output}"),
                timeout: Duration::from_secs(5),
                max_output_bytes: 4096,
                work_dir: env::temp_dir().join("nexium-grader-test"),
            },
        }
    }
}
