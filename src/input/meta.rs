/// A metadata field recovered from a coefficient file name. `Parsed` keeps
/// the literal token alongside the numeric value: per-R grouping compares
/// tokens exactly, never re-formatted floats, so two files group together
/// only when their file names agree digit for digit.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaField {
    Parsed { token: String, value: f64 },
    Unparsed,
}

impl MetaField {
    /// Numeric value, with the NaN sentinel for the unparsed case.
    pub fn value_or_nan(&self) -> f64 {
        match self {
            MetaField::Parsed { value, .. } => *value,
            MetaField::Unparsed => f64::NAN,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            MetaField::Parsed { token, .. } => Some(token),
            MetaField::Unparsed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub r: MetaField,
    pub y: MetaField,
}

/// Parse the documented file name grammar
/// `coeffs_R_<R with 12 decimals>_Y_<Y with 3 decimals>.txt`.
///
/// Each field is recovered independently: a file name whose Y token is
/// corrupt still yields a parsed R, and vice versa. A name that does not
/// match the outer shape at all yields `Unparsed` for both fields; the
/// file's numeric content is still processed.
pub fn parse_file_meta(file_name: &str) -> FileMeta {
    let unparsed = FileMeta {
        r: MetaField::Unparsed,
        y: MetaField::Unparsed,
    };

    let Some(stem) = file_name.strip_suffix(".txt") else {
        return unparsed;
    };
    let Some(rest) = stem.strip_prefix("coeffs_R_") else {
        return unparsed;
    };
    let Some(sep) = rest.find("_Y_") else {
        return unparsed;
    };
    let r_token = &rest[..sep];
    let y_token = &rest[sep + 3..];

    FileMeta {
        r: parse_field(r_token),
        y: parse_field(y_token),
    }
}

fn parse_field(token: &str) -> MetaField {
    if token.is_empty() || token.contains('_') {
        return MetaField::Unparsed;
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => MetaField::Parsed {
            token: token.to_string(),
            value,
        },
        _ => MetaField::Unparsed,
    }
}
