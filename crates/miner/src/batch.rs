use pacer_config::{MAX_BATCH_SIZE, MAX_PAYMENT_AMOUNT, MIN_BATCH_SIZE, MIN_PAYMENT_AMOUNT};
use rand::seq::SliceRandom;
use rand::Rng;

/// One payment of a synthetic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSlot {
    pub recipient: String,
    /// Whole coins
    pub amount: u64,
}

/// Draws a payment batch for one cycle.
///
/// The batch size is uniform in [`MIN_BATCH_SIZE`]..=[`MAX_BATCH_SIZE`], each
/// amount uniform in [`MIN_PAYMENT_AMOUNT`]..=[`MAX_PAYMENT_AMOUNT`], and
/// each recipient drawn uniformly, with replacement, from `recipients`. An
/// empty pool yields an empty batch.
pub fn plan_batch<R: Rng + ?Sized>(rng: &mut R, recipients: &[String]) -> Vec<PaymentSlot> {
    if recipients.is_empty() {
        return Vec::new();
    }

    let size = rng.gen_range(MIN_BATCH_SIZE..=MAX_BATCH_SIZE);
    (0..size)
        .filter_map(|_| {
            let amount = rng.gen_range(MIN_PAYMENT_AMOUNT..=MAX_PAYMENT_AMOUNT);
            recipients.choose(&mut *rng).map(|recipient| PaymentSlot {
                recipient: recipient.clone(),
                amount,
            })
        })
        .collect()
}
