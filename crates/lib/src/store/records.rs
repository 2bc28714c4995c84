//! Line codec for the three record files.
//!
//! Each file holds exactly one kind of record, so decoding is selected by the
//! file being read rather than by inspecting the line.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;

use crate::{
    constants::{GRANT_FILE, ROLE_FILE, USER_FILE},
    credential::Credential,
    types::{Grant, Role, Subject, User},
};

/// The kind of record stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Role,
    Grant,
}

impl RecordKind {
    /// Files are loaded in this order; grants resolve their role against the
    /// roles loaded before them.
    pub const LOAD_ORDER: [RecordKind; 3] = [RecordKind::User, RecordKind::Role, RecordKind::Grant];

    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::User => USER_FILE,
            RecordKind::Role => ROLE_FILE,
            RecordKind::Grant => GRANT_FILE,
        }
    }

    fn field_count(self) -> usize {
        match self {
            RecordKind::User => 8,
            RecordKind::Role => 2,
            RecordKind::Grant => 5,
        }
    }
}

/// One persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    User(User),
    Role(Role),
    Grant(Grant),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::User(_) => RecordKind::User,
            Record::Role(_) => RecordKind::Role,
            Record::Grant(_) => RecordKind::Grant,
        }
    }

    fn fields(&self) -> Vec<String> {
        match self {
            Record::User(user) => vec![
                user.user_id.clone(),
                user.credential.encoded_secret(),
                user.credential.salt().to_string(),
                user.credential.encoded_hash(),
                user.email.clone(),
                user.description.clone(),
                format_timestamp(user.created_at),
                user.role_id.clone(),
            ],
            Record::Role(role) => vec![role.role_id.clone(), role.name.clone()],
            Record::Grant(grant) => vec![
                grant.resource.clone(),
                grant.subject.as_stored().to_string(),
                grant.role.role_id.clone(),
                format_timestamp(grant.granted_at),
                format_timestamp(grant.expires_at),
            ],
        }
    }

    /// Encode as one complete CSV line, terminator included.
    pub(crate) fn encode_line(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(self.fields())?;
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// Decode a line of `user.conf`.
pub(crate) fn decode_user(fields: &StringRecord) -> Result<User, String> {
    expect_fields(fields, RecordKind::User)?;
    let credential = Credential::from_stored(&fields[1], &fields[2], &fields[3])
        .map_err(|e| format!("invalid credential encoding: {e}"))?;
    Ok(User {
        user_id: fields[0].to_string(),
        email: fields[4].to_string(),
        description: fields[5].to_string(),
        created_at: parse_timestamp(&fields[6])?,
        role_id: fields[7].to_string(),
        credential,
    })
}

/// Decode a line of `role.conf`.
pub(crate) fn decode_role(fields: &StringRecord) -> Result<Role, String> {
    expect_fields(fields, RecordKind::Role)?;
    Ok(Role {
        role_id: fields[0].to_string(),
        name: fields[1].to_string(),
    })
}

/// Decode a line of `filepermission.conf`; an unknown role id yields the
/// zero-value role.
pub(crate) fn decode_grant(
    fields: &StringRecord,
    roles: &HashMap<String, Role>,
) -> Result<Grant, String> {
    expect_fields(fields, RecordKind::Grant)?;
    Ok(Grant {
        resource: fields[0].to_string(),
        subject: Subject::from_stored(&fields[1]),
        role: roles.get(&fields[2]).cloned().unwrap_or_default(),
        granted_at: parse_timestamp(&fields[3])?,
        expires_at: parse_timestamp(&fields[4])?,
    })
}

fn expect_fields(fields: &StringRecord, kind: RecordKind) -> Result<(), String> {
    let expected = kind.field_count();
    if fields.len() != expected {
        return Err(format!(
            "expected {expected} fields, found {}",
            fields.len()
        ));
    }
    Ok(())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))
}
