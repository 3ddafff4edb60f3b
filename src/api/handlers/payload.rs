//! Request bodies: JSON or HTML form posts, with lenient numbers.
//!
//! Browsers post `application/x-www-form-urlencoded`, scripts post JSON. Both
//! land in the same request types. Numeric fields accept integers, floats
//! (rounded) and numeric strings, since form values are always strings.

use axum::{
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body extractor that picks `Form` or `Json` from the `Content-Type`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

/// `deserialize_with` helpers for client-supplied numbers.
pub(crate) mod lenient {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use std::fmt;

    // Past this magnitude an f64 no longer maps onto an i64.
    const F64_I64_LIMIT: f64 = 9.0e18;

    struct IntegerVisitor;

    impl<'de> Visitor<'de> for IntegerVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            round(value)
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Float(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(round))
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(Self)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn round(value: f64) -> Option<i64> {
        let rounded = value.round();
        (rounded.is_finite() && rounded.abs() < F64_I64_LIMIT).then_some(rounded as i64)
    }

    /// Required integer.
    pub(crate) fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer
            .deserialize_any(IntegerVisitor)?
            .ok_or_else(|| de::Error::custom("a number is required"))
    }

    /// Optional integer; `null` and blank strings are `None`.
    pub(crate) fn optional_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        deserializer
            .deserialize_any(IntegerVisitor)?
            .map(|value| T::try_from(value).map_err(|_| de::Error::custom("number out of range")))
            .transpose()
    }
}
