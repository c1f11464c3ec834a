//! Loan-application status.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Status of a loan application.
///
/// Every application starts at `Pending`; the role-gated transitions
/// (verify, reject, approve, admin-reject) are legal **only** from
/// `Pending`. The other three states are terminal under those operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Verified,
    Rejected,
    Approved,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Verified => "verified",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Approved => "approved",
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "verified" => Ok(ApplicationStatus::Verified),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "approved" => Ok(ApplicationStatus::Approved),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        for (status, expected) in [
            (ApplicationStatus::Pending, "\"pending\""),
            (ApplicationStatus::Verified, "\"verified\""),
            (ApplicationStatus::Rejected, "\"rejected\""),
            (ApplicationStatus::Approved, "\"approved\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), expected);
        }
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!("archived".parse::<ApplicationStatus>().is_err());
    }
}
