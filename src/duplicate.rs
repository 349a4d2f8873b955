use chrono::{DateTime, Duration, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::config::DuplicateConfig;
use crate::decimal::Money;
use crate::errors::{PaymentError, Result};
use crate::model::{Fee, Payment, PaymentFeeLink};

/// collaborator that returns links whose payment sets contain a recent entry
/// matching the candidate on user, amount, service, case identity and channel
pub trait RecentLinkQuery {
    fn find_recent_matching_links(
        &self,
        payment: &Payment,
        window_minutes: i64,
    ) -> Vec<PaymentFeeLink>;
}

/// duplicate payment detector.
///
/// best-effort heuristic: a candidate payment is a likely duplicate when a
/// link created within the trailing window carries a matching payment and an
/// equal fee set. there is no locking between this read and the candidate's
/// own insert, so two identical payments racing within the window can both
/// pass — closing that gap needs a uniqueness constraint in the store.
pub struct DuplicateDetector<Q> {
    query: Q,
    config: DuplicateConfig,
}

impl<Q: RecentLinkQuery> DuplicateDetector<Q> {
    pub fn new(query: Q, config: DuplicateConfig) -> Self {
        Self { query, config }
    }

    /// read-only check; fails with DuplicatePayment when a matching recent
    /// link is found, otherwise passes silently
    pub fn check(&self, payment: &Payment, request_fees: &[Fee]) -> Result<()> {
        let links = self
            .query
            .find_recent_matching_links(payment, self.config.check_interval_minutes);
        let duplicate = links
            .iter()
            .any(|link| fee_sets_match(request_fees, &link.fees));
        if duplicate {
            return Err(PaymentError::DuplicatePayment {
                window_minutes: self.config.check_interval_minutes,
            });
        }
        Ok(())
    }
}

/// identity under which two fees count as the same charge.
/// None volume orders before any specified volume.
fn fee_key(fee: &Fee) -> (&str, &str, Option<u32>, Money) {
    (
        fee.code.as_str(),
        fee.version.as_str(),
        fee.volume,
        fee.calculated_amount,
    )
}

/// multiset equality on the 4-tuple key: equal cardinality, and every request
/// fee consumed by a distinct db fee. position is irrelevant.
fn fee_sets_match(request_fees: &[Fee], db_fees: &[Fee]) -> bool {
    if request_fees.len() != db_fees.len() {
        return false;
    }
    let mut unmatched: Vec<&Fee> = db_fees.iter().collect();
    for fee in request_fees {
        match unmatched
            .iter()
            .position(|db_fee| fee_key(db_fee) == fee_key(fee))
        {
            Some(index) => {
                unmatched.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}

/// in-memory query over a set of links, for tests and embedding.
/// reproduces the criteria the production store is expected to apply.
pub struct MemoryLinkQuery<'t> {
    links: Vec<PaymentFeeLink>,
    time: &'t SafeTimeProvider,
}

impl<'t> MemoryLinkQuery<'t> {
    pub fn new(links: Vec<PaymentFeeLink>, time: &'t SafeTimeProvider) -> Self {
        Self { links, time }
    }
}

impl RecentLinkQuery for MemoryLinkQuery<'_> {
    fn find_recent_matching_links(
        &self,
        payment: &Payment,
        window_minutes: i64,
    ) -> Vec<PaymentFeeLink> {
        let to = self.time.now();
        let from = to - Duration::minutes(window_minutes);
        self.links
            .iter()
            .filter(|link| {
                link.payments
                    .iter()
                    .any(|existing| matches_candidate(existing, payment, from, to))
            })
            .cloned()
            .collect()
    }
}

fn matches_candidate(
    existing: &Payment,
    candidate: &Payment,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> bool {
    if existing.user_id != candidate.user_id
        || existing.amount != candidate.amount
        || existing.service_type != candidate.service_type
    {
        return false;
    }
    // ccd case number preferred, case reference as fallback
    let case_matches = match &candidate.ccd_case_number {
        Some(ccd) => existing.ccd_case_number.as_ref() == Some(ccd),
        None => existing.case_reference == candidate.case_reference,
    };
    if !case_matches {
        return false;
    }
    // channel only constrains the match when the candidate specifies one
    if let Some(channel) = candidate.channel {
        if existing.channel != Some(channel) {
            return false;
        }
    }
    existing.date_created >= from && existing.date_created <= to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentChannel, PaymentMethod, ServiceType};
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2021, 3, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn request_fee() -> Fee {
        Fee::builder()
            .code("X0001")
            .version("1")
            .volume(1)
            .calculated_amount(Money::from_minor(1199))
            .date_created(Utc.with_ymd_and_hms(2021, 3, 15, 9, 59, 0).unwrap())
            .build()
            .unwrap()
    }

    fn db_fee(code: &str, version: &str, volume: u32) -> Fee {
        Fee::builder()
            .code(code)
            .version(version)
            .volume(volume)
            .calculated_amount(Money::from_minor(1199))
            .date_created(Utc.with_ymd_and_hms(2021, 3, 15, 9, 59, 0).unwrap())
            .build()
            .unwrap()
    }

    fn a_payment(time: &SafeTimeProvider) -> Payment {
        Payment::builder()
            .amount(Money::from_minor(1199))
            .reference("RC-1519-9028-1909-3890")
            .ccd_case_number("ccdCaseNumber")
            .service_type(ServiceType::Probate)
            .channel(PaymentChannel::Online)
            .method(PaymentMethod::Card)
            .user_id("user-1")
            .date_created(time.now())
            .build()
            .unwrap()
    }

    fn link_with(fees: Vec<Fee>, payment: Payment) -> PaymentFeeLink {
        PaymentFeeLink::new("RC-1519-9028-1909-3890")
            .with_ccd_case_number("ccdCaseNumber")
            .with_fees(fees)
            .with_payments(vec![payment])
    }

    fn detector<'t>(
        links: Vec<PaymentFeeLink>,
        time: &'t SafeTimeProvider,
    ) -> DuplicateDetector<MemoryLinkQuery<'t>> {
        DuplicateDetector::new(MemoryLinkQuery::new(links, time), DuplicateConfig::default())
    }

    #[test]
    fn test_no_matching_payments_passes() {
        let time = test_time();
        let payment = a_payment(&time);
        let detector = detector(vec![], &time);
        assert!(detector.check(&payment, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_identical_payment_and_fee_set_is_duplicate() {
        let time = test_time();
        let payment = a_payment(&time);
        let links = vec![link_with(vec![request_fee()], payment.clone())];
        let detector = detector(links, &time);

        assert!(matches!(
            detector.check(&payment, &[request_fee()]),
            Err(PaymentError::DuplicatePayment { window_minutes: 2 })
        ));
    }

    #[test]
    fn test_different_fee_code_is_not_duplicate() {
        let time = test_time();
        let payment = a_payment(&time);
        let links = vec![link_with(vec![db_fee("X0002", "1", 1)], payment.clone())];
        let detector = detector(links, &time);
        assert!(detector.check(&payment, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_different_fee_version_is_not_duplicate() {
        let time = test_time();
        let payment = a_payment(&time);
        let links = vec![link_with(vec![db_fee("X0001", "4", 1)], payment.clone())];
        let detector = detector(links, &time);
        assert!(detector.check(&payment, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_different_fee_volume_is_not_duplicate() {
        let time = test_time();
        let payment = a_payment(&time);
        let links = vec![link_with(vec![db_fee("X0001", "1", 4)], payment.clone())];
        let detector = detector(links, &time);
        assert!(detector.check(&payment, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_extra_db_fee_breaks_cardinality() {
        let time = test_time();
        let payment = a_payment(&time);
        let links = vec![link_with(
            vec![request_fee(), db_fee("X0002", "1", 1)],
            payment.clone(),
        )];
        let detector = detector(links, &time);
        assert!(detector.check(&payment, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_repeated_fees_need_matching_multiplicity() {
        let time = test_time();
        let payment = a_payment(&time);

        // db has [X0001, X0002]; request has [X0001, X0001]
        let links = vec![link_with(
            vec![request_fee(), db_fee("X0002", "1", 1)],
            payment.clone(),
        )];
        let detector = detector(links, &time);
        assert!(detector
            .check(&payment, &[request_fee(), request_fee()])
            .is_ok());

        // db has [X0001, X0001] too: duplicate
        let links = vec![link_with(
            vec![request_fee(), request_fee()],
            payment.clone(),
        )];
        let detector = DuplicateDetector::new(
            MemoryLinkQuery::new(links, &time),
            DuplicateConfig::default(),
        );
        assert!(detector
            .check(&payment, &[request_fee(), request_fee()])
            .is_err());
    }

    #[test]
    fn test_unspecified_volume_only_matches_unspecified() {
        let time = test_time();
        let payment = a_payment(&time);
        let mut no_volume = request_fee();
        no_volume.volume = None;

        let links = vec![link_with(vec![request_fee()], payment.clone())];
        let detector = detector(links, &time);
        assert!(detector.check(&payment, &[no_volume.clone()]).is_ok());

        let links = vec![link_with(vec![no_volume.clone()], payment.clone())];
        let detector = DuplicateDetector::new(
            MemoryLinkQuery::new(links, &time),
            DuplicateConfig::default(),
        );
        assert!(detector.check(&payment, &[no_volume]).is_err());
    }

    #[test]
    fn test_payment_outside_window_passes() {
        let time = test_time();
        let earlier = a_payment(&time);
        let links = vec![link_with(vec![request_fee()], earlier)];

        // move past the 2-minute window
        let control = time.test_control().unwrap();
        control.advance(Duration::minutes(3));

        let candidate = a_payment(&time);
        let detector = detector(links, &time);
        assert!(detector.check(&candidate, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_payment_inside_window_is_caught() {
        let time = test_time();
        let earlier = a_payment(&time);
        let links = vec![link_with(vec![request_fee()], earlier)];

        let control = time.test_control().unwrap();
        control.advance(Duration::seconds(90));

        let candidate = a_payment(&time);
        let detector = detector(links, &time);
        assert!(detector.check(&candidate, &[request_fee()]).is_err());
    }

    #[test]
    fn test_case_reference_fallback_when_ccd_absent() {
        let time = test_time();
        let mut existing = a_payment(&time);
        existing.ccd_case_number = None;
        existing.case_reference = Some("caseRef1".to_string());

        let links = vec![link_with(vec![request_fee()], existing)];
        let detector = detector(links, &time);

        let mut candidate = a_payment(&time);
        candidate.ccd_case_number = None;
        candidate.case_reference = Some("caseRef1".to_string());
        assert!(detector.check(&candidate, &[request_fee()]).is_err());

        let mut other_case = a_payment(&time);
        other_case.ccd_case_number = None;
        other_case.case_reference = Some("caseRef2".to_string());
        assert!(detector.check(&other_case, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_different_amount_is_not_duplicate() {
        let time = test_time();
        let existing = a_payment(&time);
        let links = vec![link_with(vec![request_fee()], existing)];
        let detector = detector(links, &time);

        let mut candidate = a_payment(&time);
        candidate.amount = Money::from_minor(1200);
        assert!(detector.check(&candidate, &[request_fee()]).is_ok());
    }

    #[test]
    fn test_candidate_without_channel_matches_any_channel() {
        let time = test_time();
        let existing = a_payment(&time);
        let links = vec![link_with(vec![request_fee()], existing)];
        let detector = detector(links, &time);

        let mut candidate = a_payment(&time);
        candidate.channel = None;
        assert!(detector.check(&candidate, &[request_fee()]).is_err());
    }
}
