//! Response validation command.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use sp_saml::conditions::parse_saml_time;
use sp_saml::{Attributes, Response, ResponseOptions, Settings};
use tabled::Tabled;

use crate::cli::ValidateArgs;
use crate::config::{CliConfig, OutputFormat};
use crate::output;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct FailureRow {
    /// Failure code.
    pub kind: String,
    /// Reason.
    pub message: String,
}

#[derive(Tabled)]
struct FieldRow {
    field: &'static str,
    value: String,
}

#[derive(Tabled)]
struct AttributeRow {
    name: String,
    values: String,
}

/// What a Response asserts and whether it can be trusted.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Overall result.
    pub valid: bool,
    /// Last pipeline stage reached.
    pub stage: String,
    /// Failures, first one decisive.
    pub failures: Vec<FailureRow>,
    /// Top-level status code.
    pub status_code: Option<String>,
    /// Subject NameID.
    pub name_id: Option<String>,
    /// NameID format.
    pub name_id_format: Option<String>,
    /// Assertion issuer.
    pub issuer: Option<String>,
    /// Assertion ID.
    pub assertion_id: Option<String>,
    /// IdP session index.
    pub session_index: Option<String>,
    /// IdP session expiry.
    pub session_expires_at: Option<DateTime<Utc>>,
    /// Asserted attributes.
    pub attributes: Attributes,
}

/// Builds the report for a Response with settings applied.
pub fn build_report(response: &Response) -> ValidationReport {
    let outcome = response.validation_outcome();
    ValidationReport {
        valid: outcome.is_valid(),
        stage: outcome.stage.to_string(),
        failures: outcome
            .failures
            .iter()
            .map(|f| FailureRow {
                kind: f.kind.to_string(),
                message: f.message.clone(),
            })
            .collect(),
        status_code: response.status_code(),
        name_id: response.name_id(),
        name_id_format: response.name_id_format(),
        issuer: response.issuer(),
        assertion_id: response.assertion_id(),
        session_index: response.session_index(),
        session_expires_at: response.session_expires_at(),
        attributes: response.attributes(),
    }
}

/// Layers command-line trust overrides over the configured settings.
///
/// `--settings` replaces the configured table; individual flags then win.
pub fn effective_settings(args: &ValidateArgs, config: &CliConfig) -> crate::CliResult<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => config.settings.clone(),
    };
    if let Some(fingerprint) = &args.fingerprint {
        settings.idp_cert_fingerprint = Some(fingerprint.clone());
    }
    if let Some(algorithm) = args.fingerprint_algorithm {
        settings.idp_cert_fingerprint_algorithm = algorithm;
    }
    if let Some(path) = &args.cert {
        settings.idp_cert = Some(std::fs::read_to_string(path)?);
    }
    if let Some(audience) = &args.audience {
        settings.sp_entity_id = Some(audience.clone());
    }
    Ok(settings)
}

/// Layers command-line option overrides over the configured options.
pub fn effective_options(args: &ValidateArgs, config: &CliConfig) -> crate::CliResult<ResponseOptions> {
    let mut options = config.options.to_response_options();
    if let Some(drift) = args.clock_drift {
        options.allowed_clock_drift = drift;
    }
    if args.multi_value {
        options.single_value_compatibility = false;
    }
    options.skip_conditions |= args.skip_conditions;
    options.skip_audience |= args.skip_audience;
    if let Some(at) = &args.at {
        let now = parse_saml_time(at).ok_or_else(|| {
            crate::CliError::InvalidArgument(format!("--at is not an RFC 3339 timestamp: {at}"))
        })?;
        options = options.at(now);
    }
    Ok(options)
}

/// Runs the validate command. Returns whether the Response is valid.
pub fn run_validate(
    args: &ValidateArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> crate::CliResult<bool> {
    let payload = super::read_input(&args.payload)?;
    let response = Response::from_bytes(&payload, effective_options(args, config)?)?
        .with_settings(effective_settings(args, config)?);
    tracing::debug!(payload = %args.payload.display(), "validating SAML response");

    let report = build_report(&response);
    match format {
        OutputFormat::Json => output::json(&report)?,
        OutputFormat::Table => print_table(&report),
    }
    Ok(report.valid)
}

fn print_table(report: &ValidationReport) {
    if report.valid {
        output::success("Response is valid");
    } else {
        output::error(&format!("Response is invalid (stopped at {})", report.stage));
        output::table(&report.failures, "No failures recorded.");
    }

    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".dimmed().to_string());
    let fields = vec![
        FieldRow { field: "Status", value: show(&report.status_code) },
        FieldRow { field: "NameID", value: show(&report.name_id) },
        FieldRow { field: "NameID format", value: show(&report.name_id_format) },
        FieldRow { field: "Issuer", value: show(&report.issuer) },
        FieldRow { field: "Assertion ID", value: show(&report.assertion_id) },
        FieldRow { field: "Session index", value: show(&report.session_index) },
        FieldRow {
            field: "Session expires",
            value: show(&report.session_expires_at.map(|t| t.to_rfc3339())),
        },
    ];
    output::table(&fields, "No fields.");

    let multi = !report.attributes.single_value_compatibility();
    let attributes: Vec<AttributeRow> = report
        .attributes
        .iter()
        .map(|(name, values)| AttributeRow {
            name: name.to_string(),
            values: if multi {
                values.iter().map(|v| display_value(v.as_deref())).collect::<Vec<_>>().join(", ")
            } else {
                display_value(values.first().and_then(Option::as_deref))
            },
        })
        .collect();
    output::table(&attributes, "No attributes.");
}

fn display_value(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "nil".dimmed().to_string(),
    }
}
