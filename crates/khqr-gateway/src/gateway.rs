//! Asynchronous interface to a KHQR payment backend.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::proto::{PaymentStatus, SourceInfo};

/// Operations a payment backend offers for an issued KHQR payload.
pub trait PaymentGateway {
    type Error: Debug + Display;

    /// Exchanges a payload for a short deep link that opens the payer's
    /// banking app.
    fn generate_deeplink(
        &self,
        qr: &str,
        source_info: &SourceInfo,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Looks up one payment by the MD5 digest of its payload.
    fn check_payment(
        &self,
        md5: &str,
    ) -> impl Future<Output = Result<PaymentStatus, Self::Error>> + Send;

    /// Looks up many payments at once and returns the digests that are paid.
    fn check_bulk_payments(
        &self,
        md5_list: &[String],
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;
}

impl<T: PaymentGateway> PaymentGateway for Arc<T> {
    type Error = T::Error;

    fn generate_deeplink(
        &self,
        qr: &str,
        source_info: &SourceInfo,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        self.as_ref().generate_deeplink(qr, source_info)
    }

    fn check_payment(
        &self,
        md5: &str,
    ) -> impl Future<Output = Result<PaymentStatus, Self::Error>> + Send {
        self.as_ref().check_payment(md5)
    }

    fn check_bulk_payments(
        &self,
        md5_list: &[String],
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send {
        self.as_ref().check_bulk_payments(md5_list)
    }
}
