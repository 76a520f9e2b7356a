use rust_decimal::Decimal;

//Seam for a real payment processor. Checkout only sees the outcome, so a
//gateway can be swapped in without touching order creation.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, amount: Decimal, method: &str) -> PaymentOutcome;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    Captured,
    Declined,
}

impl PaymentOutcome {
    pub fn is_paid(self) -> bool {
        matches!(self, PaymentOutcome::Captured)
    }
}

//Stub gateway: captures every charge. No processor integration exists yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantCapture;

impl PaymentGateway for InstantCapture {
    fn charge(&self, _amount: Decimal, _method: &str) -> PaymentOutcome {
        PaymentOutcome::Captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn instant_capture_always_captures() {
        let gateway = InstantCapture;
        let outcome = gateway.charge(dec!(19.98), "card");
        assert!(outcome.is_paid());
    }
}
