use std::time::Duration;

use gpui::{AbsoluteLength, DefiniteLength, Pixels, SharedString, px, rems};
use serde::{Deserialize, Deserializer, de::Error};
use smallvec::SmallVec;

use super::ThemeVariant;

pub fn de_string_or_non_empty_list<'de, D>(
    deserializer: D,
) -> Result<SmallVec<[SharedString; 1]>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        One(SharedString),
        Many(SmallVec<[SharedString; 1]>),
    }

    match StringOrVec::deserialize(deserializer)? {
        StringOrVec::One(string) => Ok(SmallVec::from_buf([string])),
        StringOrVec::Many(vec) => {
            if vec.is_empty() {
                return Err(D::Error::custom("list can't be empty."));
            }

            Ok(vec)
        }
    }
}

pub fn de_variants<'de, D>(deserializer: D) -> Result<SmallVec<[ThemeVariant; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SmallVec::deserialize(deserializer)?;

    if value.is_empty() {
        return Err(D::Error::custom(
            "at least one theme variant needs to be provided.",
        ));
    }

    Ok(value)
}

pub fn de_pixels<'de, D>(deserializer: D) -> Result<Pixels, D::Error>
where
    D: Deserializer<'de>,
{
    pixels_from(StringOrFloat::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Like [`de_pixels`], but `null` or `0` means "not set".
pub fn de_optional_pixels<'de, D>(deserializer: D) -> Result<Option<Pixels>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<StringOrFloat>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let pixels = pixels_from(value).map_err(D::Error::custom)?;
    Ok((pixels > px(0.)).then_some(pixels))
}

/// Durations are written as milliseconds, either `150` or `"150ms"`.
pub fn de_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::Float(millis) => millis,
        StringOrFloat::String(string) => string
            .strip_suffix("ms")
            .and_then(|string| string.trim().parse::<f32>().ok())
            .ok_or_else(|| D::Error::custom("expected f32 or string ending with 'ms'"))?,
    };

    if millis < 0. {
        return Err(D::Error::custom("duration can't be negative"));
    }

    Ok(Duration::from_millis(millis.round() as u64))
}

pub fn de_abs_length<'de, D>(deserializer: D) -> Result<AbsoluteLength, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::Float(num) => return Ok(AbsoluteLength::Pixels(px(num))),

        StringOrFloat::String(string) => {
            if let Some(string) = string.strip_suffix("rem")
                && let Ok(value) = string.parse::<f32>()
            {
                return Ok(AbsoluteLength::Rems(rems(value)));
            } else if let Some(string) = string.strip_suffix("px")
                && let Ok(value) = string.parse::<f32>()
            {
                return Ok(AbsoluteLength::Pixels(px(value)));
            }
        }
    }

    Err(D::Error::custom(
        "expected f32 or string containing a f32 ending with 'rem' or 'px'",
    ))
}

pub fn de_def_length<'de, D>(deserializer: D) -> Result<DefiniteLength, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::Float(num) => {
            return Ok(DefiniteLength::Absolute(AbsoluteLength::Pixels(px(num))));
        }

        StringOrFloat::String(string) => {
            if let Some(string) = string.strip_suffix("%")
                && let Ok(value) = string.parse::<f32>()
            {
                return Ok(DefiniteLength::Fraction(value / 100.));
            }

            if let Some(string) = string.strip_suffix("rem")
                && let Ok(value) = string.parse::<f32>()
            {
                return Ok(DefiniteLength::Absolute(AbsoluteLength::Rems(rems(value))));
            } else if let Some(string) = string.strip_suffix("px")
                && let Ok(value) = string.parse::<f32>()
            {
                return Ok(DefiniteLength::Absolute(AbsoluteLength::Pixels(px(value))));
            }
        }
    }

    Err(D::Error::custom(
        "expected f32 or string containing a f32 ending with '%', 'rem' or 'px'",
    ))
}

fn pixels_from(value: StringOrFloat) -> Result<Pixels, &'static str> {
    match value {
        StringOrFloat::Float(pixels) => Ok(px(pixels)),
        StringOrFloat::String(string) => string
            .strip_suffix("px")
            .ok_or("expected string to end with 'px'")?
            .parse::<f32>()
            .map(px)
            .map_err(|_| "could not convert string into pixels"),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrFloat {
    String(String),
    Float(f32),
}
