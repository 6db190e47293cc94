use alertroute::cli::Cli;
use alertroute::config::Config;
use clap::Parser;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

fn cli_for(path: &PathBuf, extra: &[&str]) -> Cli {
    let mut args = vec!["alertroute", "--config", path.to_str().unwrap()];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        log_file = "logs/app.log"
        [server]
        listen_addr = "127.0.0.1:9000"
        [routing]
        reference_table_path = "/etc/alertroute/routes.csv"
        template_path = "/etc/alertroute/email.txt"
        [email]
        smtp_server = "mail.internal"
        smtp_port = 2525
        starttls = true
        from = "noc@internal"
        to = "oncall@internal"
        timeout_seconds = 5
        [splunk]
        hec_url = "https://splunk.internal:8088/services/collector"
        token = "abc-123"
        timeout_seconds = 3
        [metrics]
        enabled = true
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(&cli_for(&path, &[])).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("logs/app.log")));
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(
            config.routing.reference_table_path,
            PathBuf::from("/etc/alertroute/routes.csv")
        );
        assert_eq!(
            config.routing.template_path,
            PathBuf::from("/etc/alertroute/email.txt")
        );
        assert_eq!(config.email.smtp_server, "mail.internal");
        assert_eq!(config.email.smtp_port, 2525);
        assert!(config.email.starttls);
        assert_eq!(config.email.from, "noc@internal");
        assert_eq!(config.email.to, "oncall@internal");
        assert_eq!(config.email.timeout_seconds, 5);
        assert_eq!(
            config.splunk.hec_url,
            "https://splunk.internal:8088/services/collector"
        );
        assert_eq!(config.splunk.token, "abc-123");
        assert_eq!(config.splunk.timeout_seconds, 3);
        assert!(config.metrics.enabled);
    });
}

#[test]
#[serial]
fn test_load_default_values() {
    with_config_file("", |path| {
        let config = Config::load(&cli_for(&path, &[])).unwrap();
        assert_eq!(config, Config::default());
    });
}

#[test]
#[serial]
fn test_partial_section_keeps_other_defaults() {
    let toml_content = r#"
        [email]
        to = "team@example.com"
    "#;

    with_config_file(toml_content, |path| {
        let config = Config::load(&cli_for(&path, &[])).unwrap();
        let defaults = Config::default();
        assert_eq!(config.email.to, "team@example.com");
        assert_eq!(config.email.from, defaults.email.from);
        assert_eq!(config.email.smtp_port, 25);
        assert_eq!(config.splunk, defaults.splunk);
    });
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let toml_content = r#"
        [email]
        smtp_port = "twenty-five"
    "#;

    with_config_file(toml_content, |path| {
        assert!(Config::load(&cli_for(&path, &[])).is_err());
    });
}

#[test]
#[serial]
fn test_missing_explicit_config_file_is_an_error() {
    let cli = Cli::try_parse_from(["alertroute", "--config", "/nonexistent/alertroute.toml"])
        .unwrap();
    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("Configuration file not found"));
}

#[test]
#[serial]
fn test_legacy_environment_variables_are_honoured() {
    std::env::set_var("SPLUNK_HEC_URL", "https://hec.from.env/services/collector");
    std::env::set_var("SPLUNK_TOKEN", "env-token");
    std::env::set_var("EMAIL_TO", "env-to@example.com");
    std::env::set_var("EMAIL_FROM", "env-from@example.com");
    std::env::set_var("SMTP_SERVER", "smtp.from.env");

    with_config_file("", |path| {
        let config = Config::load(&cli_for(&path, &[]));

        std::env::remove_var("SPLUNK_HEC_URL");
        std::env::remove_var("SPLUNK_TOKEN");
        std::env::remove_var("EMAIL_TO");
        std::env::remove_var("EMAIL_FROM");
        std::env::remove_var("SMTP_SERVER");

        let config = config.unwrap();
        assert_eq!(config.splunk.hec_url, "https://hec.from.env/services/collector");
        assert_eq!(config.splunk.token, "env-token");
        assert_eq!(config.email.to, "env-to@example.com");
        assert_eq!(config.email.from, "env-from@example.com");
        assert_eq!(config.email.smtp_server, "smtp.from.env");
    });
}

#[test]
#[serial]
fn test_prefixed_environment_overrides_file() {
    let toml_content = r#"
        [server]
        listen_addr = "127.0.0.1:9000"
    "#;
    std::env::set_var("ALERTROUTE_SERVER__LISTEN_ADDR", "127.0.0.1:9100");
    std::env::set_var("ALERTROUTE_EMAIL__SMTP_PORT", "587");

    with_config_file(toml_content, |path| {
        let config = Config::load(&cli_for(&path, &[]));

        std::env::remove_var("ALERTROUTE_SERVER__LISTEN_ADDR");
        std::env::remove_var("ALERTROUTE_EMAIL__SMTP_PORT");

        let config = config.unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9100");
        assert_eq!(config.email.smtp_port, 587);
    });
}

#[test]
#[serial]
fn test_cli_arguments_take_precedence() {
    let toml_content = r#"
        log_level = "warn"
        [server]
        listen_addr = "127.0.0.1:9000"
        [routing]
        reference_table_path = "from-file.json"
    "#;
    std::env::set_var("ALERTROUTE_SERVER__LISTEN_ADDR", "127.0.0.1:9100");

    with_config_file(toml_content, |path| {
        let cli = cli_for(
            &path,
            &[
                "--listen-addr",
                "127.0.0.1:9200",
                "--reference-table",
                "from-cli.csv",
                "--template",
                "from-cli.txt",
                "--log-level",
                "trace",
                "--metrics",
            ],
        );
        let config = Config::load(&cli);

        std::env::remove_var("ALERTROUTE_SERVER__LISTEN_ADDR");

        let config = config.unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9200");
        assert_eq!(
            config.routing.reference_table_path,
            PathBuf::from("from-cli.csv")
        );
        assert_eq!(config.routing.template_path, PathBuf::from("from-cli.txt"));
        assert_eq!(config.log_level, "trace");
        assert!(config.metrics.enabled);
    });
}

#[test]
#[serial]
fn test_numeric_environment_values_load_as_strings() {
    std::env::set_var("SPLUNK_TOKEN", "0012345678");
    std::env::set_var("ALERTROUTE_EMAIL__TO", "12345");

    let cli = Cli::try_parse_from(["alertroute"]).unwrap();
    let config = Config::load(&cli);

    std::env::remove_var("SPLUNK_TOKEN");
    std::env::remove_var("ALERTROUTE_EMAIL__TO");

    let config = config.unwrap();
    assert_eq!(config.splunk.token, "0012345678");
    assert_eq!(config.email.to, "12345");
}
