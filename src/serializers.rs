// 🔗 Serializers - JSON projections and write payloads
//
// Read side: every projection carries its own URL and `{id, url}` references
// to its parents, built from the full chain of parent ids.
// Write side: payloads are parsed from raw JSON so missing or malformed
// fields come back as per-field messages instead of a single parse error.

use crate::entities::{Beneficiary, Office, Plan, Program, Record, User};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Longest accepted `name`
pub const NAME_MAX_LENGTH: usize = 100;

// ============================================================================
// URL BUILDER
// ============================================================================

/// Builds resource URLs, absolute when the request named a host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Root-relative URLs ("/offices/1/")
    pub fn relative() -> Self {
        UrlBuilder::default()
    }

    /// Absolute URLs under `http://{host}`
    pub fn for_host(host: &str) -> Self {
        UrlBuilder {
            base: format!("http://{}", host.trim_end_matches('/')),
        }
    }

    fn path(&self, path: String) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn offices(&self) -> String {
        self.path("/offices/".to_string())
    }

    pub fn office(&self, office: i64) -> String {
        self.path(format!("/offices/{}/", office))
    }

    pub fn programs(&self, office: i64) -> String {
        self.path(format!("/offices/{}/programs/", office))
    }

    pub fn program(&self, office: i64, program: i64) -> String {
        self.path(format!("/offices/{}/programs/{}/", office, program))
    }

    pub fn plans(&self, office: i64, program: i64) -> String {
        self.path(format!("/offices/{}/programs/{}/plans/", office, program))
    }

    pub fn plan(&self, office: i64, program: i64, plan: i64) -> String {
        self.path(format!(
            "/offices/{}/programs/{}/plans/{}/",
            office, program, plan
        ))
    }

    pub fn beneficiaries(&self, office: i64, program: i64) -> String {
        self.path(format!(
            "/offices/{}/programs/{}/beneficiaries/",
            office, program
        ))
    }

    pub fn beneficiary(&self, office: i64, program: i64, beneficiary: i64) -> String {
        self.path(format!(
            "/offices/{}/programs/{}/beneficiaries/{}/",
            office, program, beneficiary
        ))
    }

    pub fn records(&self, office: i64, program: i64, plan: i64) -> String {
        self.path(format!(
            "/offices/{}/programs/{}/plans/{}/records/",
            office, program, plan
        ))
    }

    pub fn record(&self, office: i64, program: i64, plan: i64, record: i64) -> String {
        self.path(format!(
            "/offices/{}/programs/{}/plans/{}/records/{}/",
            office, program, plan, record
        ))
    }

    pub fn users(&self) -> String {
        self.path("/users/".to_string())
    }

    pub fn user(&self, user: i64) -> String {
        self.path(format!("/users/{}/", user))
    }
}

// ============================================================================
// READ PROJECTIONS
// ============================================================================

/// Parent reference emitted instead of a flat foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfficeView {
    pub pk: i64,
    pub url: String,
    pub name: String,
    pub programs: String,
}

impl OfficeView {
    pub fn new(urls: &UrlBuilder, office: &Office) -> Self {
        OfficeView {
            pk: office.id,
            url: urls.office(office.id),
            name: office.name.clone(),
            programs: urls.programs(office.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub pk: i64,
    pub url: String,
    pub name: String,
    pub office: ParentRef,
    pub plans: String,
    pub beneficiaries: String,
}

impl ProgramView {
    pub fn new(urls: &UrlBuilder, program: &Program) -> Self {
        let office = program.office_id;
        ProgramView {
            pk: program.id,
            url: urls.program(office, program.id),
            name: program.name.clone(),
            office: ParentRef {
                id: office,
                url: urls.office(office),
            },
            plans: urls.plans(office, program.id),
            beneficiaries: urls.beneficiaries(office, program.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub pk: i64,
    pub url: String,
    pub name: String,
    pub program: ParentRef,
    pub records: String,
}

impl PlanView {
    pub fn new(urls: &UrlBuilder, office_id: i64, plan: &Plan) -> Self {
        let program = plan.program_id;
        PlanView {
            pk: plan.id,
            url: urls.plan(office_id, program, plan.id),
            name: plan.name.clone(),
            program: ParentRef {
                id: program,
                url: urls.program(office_id, program),
            },
            records: urls.records(office_id, program, plan.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryView {
    pub pk: i64,
    pub url: String,
    pub name: String,
    pub program: ParentRef,
}

impl BeneficiaryView {
    pub fn new(urls: &UrlBuilder, office_id: i64, beneficiary: &Beneficiary) -> Self {
        let program = beneficiary.program_id;
        BeneficiaryView {
            pk: beneficiary.id,
            url: urls.beneficiary(office_id, program, beneficiary.id),
            name: beneficiary.name.clone(),
            program: ParentRef {
                id: program,
                url: urls.program(office_id, program),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub pk: i64,
    pub url: String,
    pub name: String,
    pub plan: ParentRef,
    pub beneficiary: ParentRef,
}

impl RecordView {
    /// Beneficiaries share the record's program, so one chain serves both URLs
    pub fn new(urls: &UrlBuilder, office_id: i64, program_id: i64, record: &Record) -> Self {
        let plan = record.plan_id;
        RecordView {
            pk: record.id,
            url: urls.record(office_id, program_id, plan, record.id),
            name: record.name.clone(),
            plan: ParentRef {
                id: plan,
                url: urls.plan(office_id, program_id, plan),
            },
            beneficiary: ParentRef {
                id: record.beneficiary_id,
                url: urls.beneficiary(office_id, program_id, record.beneficiary_id),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub url: String,
    pub username: String,
    pub email: String,
}

impl UserView {
    pub fn new(urls: &UrlBuilder, user: &User) -> Self {
        UserView {
            url: urls.user(user.id),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

// ============================================================================
// WRITE PAYLOADS
// ============================================================================

/// Field name → messages, in the shape clients get back on a 400
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";

/// `name` on its own; used by every entity except Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameInput {
    pub name: Option<String>,
}

/// Record payload; `beneficiary` is an id within the record's program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInput {
    pub name: Option<String>,
    pub beneficiary: Option<i64>,
}

impl NameInput {
    /// With `partial` set (PATCH) absent fields are allowed
    pub fn parse(payload: &Value, partial: bool) -> Result<Self, FieldErrors> {
        let object = as_object(payload)?;
        let mut errors = FieldErrors::new();

        let name = read_name(object, partial, &mut errors);

        if errors.is_empty() {
            Ok(NameInput { name })
        } else {
            Err(errors)
        }
    }
}

impl RecordInput {
    pub fn parse(payload: &Value, partial: bool) -> Result<Self, FieldErrors> {
        let object = as_object(payload)?;
        let mut errors = FieldErrors::new();

        let name = read_name(object, partial, &mut errors);
        let beneficiary = read_pk(object, "beneficiary", partial, &mut errors);

        if errors.is_empty() {
            Ok(RecordInput { name, beneficiary })
        } else {
            Err(errors)
        }
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        field_error(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(payload)
            ),
        )
    })
}

fn read_name(
    object: &Map<String, Value>,
    partial: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let message = match object.get("name") {
        None if partial => return None,
        None => REQUIRED.to_string(),
        Some(Value::Null) => "This field may not be null.".to_string(),
        Some(Value::String(name)) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                "This field may not be blank.".to_string()
            } else if trimmed.chars().count() > NAME_MAX_LENGTH {
                format!(
                    "Ensure this field has no more than {} characters.",
                    NAME_MAX_LENGTH
                )
            } else {
                return Some(trimmed.to_string());
            }
        }
        Some(Value::Number(number)) => return Some(number.to_string()),
        Some(_) => "Not a valid string.".to_string(),
    };

    errors.entry("name".to_string()).or_default().push(message);
    None
}

fn read_pk(
    object: &Map<String, Value>,
    field: &str,
    partial: bool,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let message = match object.get(field) {
        None if partial => return None,
        None => REQUIRED.to_string(),
        Some(Value::Null) => "This field may not be null.".to_string(),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(id) => return Some(id),
            None => "Incorrect type. Expected pk value, received float.".to_string(),
        },
        Some(Value::String(text)) => match text.trim().parse::<i64>() {
            Ok(id) => return Some(id),
            Err(_) => "Incorrect type. Expected pk value, received str.".to_string(),
        },
        Some(other) => format!(
            "Incorrect type. Expected pk value, received {}.",
            json_type_name(other)
        ),
    };

    errors.entry(field.to_string()).or_default().push(message);
    None
}

/// Value of a field that a full (non-partial) parse must have produced
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, FieldErrors> {
    value.ok_or_else(|| field_error(field, REQUIRED.to_string()))
}

/// Error for a pk that parsed but names nothing reachable
pub fn missing_pk(field: &str, id: i64) -> FieldErrors {
    field_error(field, format!("Invalid pk \"{}\" - object does not exist.", id))
}

fn field_error(field: &str, message: String) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message]);
    errors
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
