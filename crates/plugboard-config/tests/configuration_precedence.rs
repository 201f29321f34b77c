//! Behaviour tests for configuration layering.

use std::cell::RefCell;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use plugboard_config::{
    Config, DEFAULT_DOCUMENT_PATH, DEFAULT_MAX_ATTEMPTS, LogFormat, default_log_filter,
    default_log_format,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const CONFIG_VARIABLES: [&str; 8] = [
    "PLUGBOARD_STORE_ROOT",
    "PLUGBOARD_DOCUMENT_PATH",
    "PLUGBOARD_LOG_FILTER",
    "PLUGBOARD_LOG_FORMAT",
    "PLUGBOARD_MAX_ATTEMPTS",
    "PLUGBOARD_INITIAL_BACKOFF_MS",
    "PLUGBOARD_MAX_BACKOFF_MS",
    "PLUGBOARD_KNOWN_CLASSES",
];

struct Harness {
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _env_lock: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_lock = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let harness = Self {
            cli_args: RefCell::new(vec![OsString::from("plugboard")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _env_lock: env_lock,
        };
        for key in CONFIG_VARIABLES {
            harness.clear_env(key);
        }
        harness
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024. The harness holds
        // the environment mutex and restores every override in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn clear_env(&self, key: &str) {
        let previous = std::env::var_os(key);
        unsafe { std::env::remove_var(key) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => {
                *self.loaded.borrow_mut() = Some(config);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error.to_string());
            }
        }
    }

    fn config(&self) -> Config {
        self.load();
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("the environment sets the retry budget to \"{attempts}\"")]
fn given_env_attempts(harness: &Harness, attempts: String) {
    harness.set_env("PLUGBOARD_MAX_ATTEMPTS", &attempts);
}

#[given("the environment sets the log format to \"{format}\"")]
fn given_env_format(harness: &Harness, format: String) {
    harness.set_env("PLUGBOARD_LOG_FORMAT", &format);
}

#[given("the environment lists known classes \"{classes}\"")]
fn given_env_classes(harness: &Harness, classes: String) {
    harness.set_env("PLUGBOARD_KNOWN_CLASSES", &classes);
}

#[when("the CLI sets the retry budget to \"{attempts}\"")]
fn when_cli_attempts(harness: &Harness, attempts: String) {
    harness.push_cli_arg("--max-attempts");
    harness.push_cli_arg(attempts);
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("the retry budget resolves to \"{attempts}\"")]
fn then_attempts(harness: &Harness, attempts: u32) {
    assert_eq!(harness.config().max_attempts(), attempts);
}

#[then("the log format resolves to \"{format}\"")]
fn then_format(harness: &Harness, format: String) {
    let expected = match format.parse::<LogFormat>() {
        Ok(parsed) => parsed,
        Err(error) => panic!("invalid expected format '{format}': {error}"),
    };
    assert_eq!(harness.config().log_format(), expected);
}

#[then("the known classes resolve to \"{classes}\"")]
fn then_classes(harness: &Harness, classes: String) {
    let expected: Vec<&str> = classes.split(',').collect();
    assert_eq!(harness.config().known_classes(), expected.as_slice());
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.config();
    assert_eq!(config.max_attempts(), DEFAULT_MAX_ATTEMPTS);
    assert_eq!(config.document_path(), DEFAULT_DOCUMENT_PATH);
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert!(config.known_classes().is_empty());
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command-line flags override the environment"
)]
fn flags_override_environment(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The environment overrides the defaults"
)]
fn environment_overrides_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply when nothing is set"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    let _ = harness;
}
