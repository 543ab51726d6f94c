use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::AnonCredsError;
use crate::payload::JsonPayload;
use crate::revocation::{AnonCredsRevRegDef, AnonCredsRevRegEntry};

/// Revocation status of every credential in a registry at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonCredsRevList {
    pub issuer_id: String,
    pub rev_reg_def_id: String,
    /// One slot per credential; 1 is revoked.
    pub revocation_list: Vec<u8>,
    pub current_accumulator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl JsonPayload for AnonCredsRevList {
    const NAME: &'static str = "AnonCredsRevList";
}

impl AnonCredsRevList {
    /// Fold entries, in consensus order, over an all-zero list sized by the
    /// definition's `maxCredNum`.
    pub fn from_rev_reg_entries(
        entries: &[AnonCredsRevRegEntry],
        rev_reg_def_id: &str,
        rev_reg_def: &AnonCredsRevRegDef,
        timestamp: Option<i64>,
    ) -> Result<Self, AnonCredsError> {
        let last = entries.last().ok_or_else(|| {
            AnonCredsError::NotFound(format!(
                "no revocation entries for registry '{}'",
                rev_reg_def_id
            ))
        })?;

        let size = rev_reg_def.value.max_cred_num as usize;
        let mut revocation_list = vec![0u8; size];
        for entry in entries {
            for (indices, bit) in [(&entry.value.revoked, 1u8), (&entry.value.issued, 0u8)] {
                for &index in indices {
                    let slot = revocation_list.get_mut(index as usize).ok_or_else(|| {
                        AnonCredsError::Validation(format!(
                            "revocation index {} out of range for {} credentials",
                            index, size
                        ))
                    })?;
                    *slot = bit;
                }
            }
        }

        Ok(Self {
            issuer_id: rev_reg_def.issuer_id.clone(),
            rev_reg_def_id: rev_reg_def_id.to_string(),
            revocation_list,
            current_accumulator: last.value.accum.clone(),
            timestamp,
        })
    }

    /// Indices currently marked revoked.
    pub fn revoked_indices(&self) -> Vec<u32> {
        self.indices_where(|bit| bit == 1)
    }

    /// Indices revoked here but not in `prev`.
    pub fn revoked_since(&self, prev: &AnonCredsRevList) -> Vec<u32> {
        self.transitions(prev, 0, 1)
    }

    /// Indices revoked in `prev` and no longer revoked here.
    pub fn issued_since(&self, prev: &AnonCredsRevList) -> Vec<u32> {
        self.transitions(prev, 1, 0)
    }

    /// Check that `revoked` is exactly the set of new revocations relative to
    /// `prev`, and return the re-issued indices.
    pub fn delta_from(
        &self,
        prev: &AnonCredsRevList,
        revoked: &[u32],
    ) -> Result<Vec<u32>, AnonCredsError> {
        if prev.revocation_list.len() != self.revocation_list.len() {
            return Err(AnonCredsError::Validation(format!(
                "revocation list size changed from {} to {}",
                prev.revocation_list.len(),
                self.revocation_list.len()
            )));
        }

        let declared: BTreeSet<u32> = revoked.iter().copied().collect();
        let observed: BTreeSet<u32> = self.revoked_since(prev).into_iter().collect();
        if declared != observed {
            return Err(AnonCredsError::Validation(format!(
                "revoked indices {:?} do not match the list change {:?}",
                declared, observed
            )));
        }
        Ok(self.issued_since(prev))
    }

    fn indices_where(&self, predicate: impl Fn(u8) -> bool) -> Vec<u32> {
        self.revocation_list
            .iter()
            .enumerate()
            .filter(|(_, bit)| predicate(**bit))
            .map(|(i, _)| i as u32)
            .collect()
    }

    fn transitions(&self, prev: &AnonCredsRevList, from: u8, to: u8) -> Vec<u32> {
        prev.revocation_list
            .iter()
            .zip(&self.revocation_list)
            .enumerate()
            .filter(|(_, (old, new))| **old == from && **new == to)
            .map(|(i, _)| i as u32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revocation::rev_reg_def::tests::rev_reg_def;
    use crate::revocation::RevRegEntryValue;
    use serde_json::json;

    const REV_REG_ID: &str = "mock-rev_reg_def-id";

    fn entry(accum: &str, revoked: &[u32], issued: &[u32]) -> AnonCredsRevRegEntry {
        AnonCredsRevRegEntry::new(RevRegEntryValue {
            accum: accum.into(),
            prev_accum: None,
            revoked: revoked.to_vec(),
            issued: issued.to_vec(),
        })
    }

    fn fold(entries: &[AnonCredsRevRegEntry]) -> AnonCredsRevList {
        AnonCredsRevList::from_rev_reg_entries(entries, REV_REG_ID, &rev_reg_def(10), None).unwrap()
    }

    #[test]
    fn test_fold_over_entries() {
        let e1 = entry("accum-1", &[5, 9], &[]);
        let e2 = entry("accum-2", &[8], &[]);
        let e3 = entry("accum-3", &[0], &[]);

        let cases = [
            (vec![e1.clone()], vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 1], "accum-1"),
            (vec![e1.clone(), e2.clone()], vec![0, 0, 0, 0, 0, 1, 0, 0, 1, 1], "accum-2"),
            (vec![e1.clone(), e3.clone()], vec![1, 0, 0, 0, 0, 1, 0, 0, 0, 1], "accum-3"),
            (vec![e1, e2, e3], vec![1, 0, 0, 0, 0, 1, 0, 0, 1, 1], "accum-3"),
        ];
        for (entries, expected_list, expected_accum) in cases {
            let list = fold(&entries);
            assert_eq!(list.revocation_list, expected_list);
            assert_eq!(list.current_accumulator, expected_accum);
            assert_eq!(list.issuer_id, "mock-issuer-id");
            assert_eq!(list.rev_reg_def_id, REV_REG_ID);
        }
    }

    #[test]
    fn test_issued_clears_earlier_revocation() {
        let list = fold(&[entry("a1", &[2, 3], &[]), entry("a2", &[], &[2])]);
        assert_eq!(list.revoked_indices(), vec![3]);
    }

    #[test]
    fn test_fold_rejects_out_of_range_and_empty() {
        let err = AnonCredsRevList::from_rev_reg_entries(
            &[entry("a1", &[10], &[])],
            REV_REG_ID,
            &rev_reg_def(10),
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), hiero_core::ErrorKind::ValidationFailure);

        let err = AnonCredsRevList::from_rev_reg_entries(&[], REV_REG_ID, &rev_reg_def(10), None)
            .unwrap_err();
        assert_eq!(err.kind(), hiero_core::ErrorKind::NotFound);
    }

    #[test]
    fn test_delta_from_previous_list() {
        let prev = fold(&[entry("a1", &[5, 9], &[])]);
        let curr = fold(&[entry("a1", &[5, 9], &[]), entry("a2", &[0], &[9])]);

        assert_eq!(curr.revoked_since(&prev), vec![0]);
        assert_eq!(curr.issued_since(&prev), vec![9]);
        assert_eq!(curr.delta_from(&prev, &[0]).unwrap(), vec![9]);

        let err = curr.delta_from(&prev, &[1]).unwrap_err();
        assert_eq!(err.kind(), hiero_core::ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_json_payload() {
        let list = AnonCredsRevList {
            issuer_id: "mock-issuer-id".into(),
            rev_reg_def_id: REV_REG_ID.into(),
            revocation_list: vec![1, 0, 0, 0, 1],
            current_accumulator: "mock-accum".into(),
            timestamp: Some(1_700_000_000),
        };
        let value = list.to_json_value().unwrap();
        assert_eq!(
            value,
            json!({
                "issuerId": "mock-issuer-id",
                "revRegDefId": REV_REG_ID,
                "revocationList": [1, 0, 0, 0, 1],
                "currentAccumulator": "mock-accum",
                "timestamp": 1_700_000_000,
            })
        );
        assert_eq!(AnonCredsRevList::from_json_value(value).unwrap(), list);

        let err = AnonCredsRevList::from_json_value(json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "AnonCredsRevList JSON parsing failed: Invalid JSON structure"
        );
    }
}
