use std::collections::BTreeMap;

use crate::checkin::{CheckInRecord, CheckInRow, CheckInSource, MoodEntryRow, StressAssessmentRow};

/// Parsed check-ins belonging to one user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserCheckIns {
    pub stress: Vec<CheckInRecord>,
    pub mood: Vec<CheckInRecord>,
}

impl UserCheckIns {
    pub fn new(stress: Vec<CheckInRecord>, mood: Vec<CheckInRecord>) -> Self {
        Self { stress, mood }
    }

    fn records_mut(&mut self, source: CheckInSource) -> &mut Vec<CheckInRecord> {
        match source {
            CheckInSource::Stress => &mut self.stress,
            CheckInSource::Mood => &mut self.mood,
        }
    }

    /// Every record of both kinds.
    pub fn all(&self) -> impl Iterator<Item = &CheckInRecord> {
        self.stress.iter().chain(self.mood.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.stress.is_empty() && self.mood.is_empty()
    }
}

/// Check-ins of many users, as seen from a mentor's dashboard.
#[derive(Clone, Debug, Default)]
pub struct CheckInLedger {
    users: BTreeMap<String, UserCheckIns>,
    skipped: usize,
}

impl CheckInLedger {
    pub fn ingest_stress(&mut self, rows: &[StressAssessmentRow]) {
        self.ingest(rows);
    }

    pub fn ingest_mood(&mut self, rows: &[MoodEntryRow]) {
        self.ingest(rows);
    }

    fn ingest<R: CheckInRow>(&mut self, rows: &[R]) {
        for row in rows {
            let Some(record) = row.to_record() else {
                self.skipped += 1;
                continue;
            };
            self.users
                .entry(row.user_id().to_string())
                .or_default()
                .records_mut(R::SOURCE)
                .push(record);
        }
    }

    pub fn user(&self, user_id: &str) -> Option<&UserCheckIns> {
        self.users.get(user_id)
    }

    pub fn user_ids(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    /// The only user in the ledger, if there is exactly one.
    pub fn sole_user(&self) -> Option<(&str, &UserCheckIns)> {
        if self.users.len() != 1 {
            return None;
        }
        self.users
            .iter()
            .next()
            .map(|(id, check_ins)| (id.as_str(), check_ins))
    }

    /// Rows dropped because they could not be placed on a calendar day.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
