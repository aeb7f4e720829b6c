/// Declares `fn $name() -> &'static Regex`, compiled once on first use and
/// shared process-wide.
#[macro_export]
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static ::regex::Regex {
            static R: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
            R.get_or_init(|| ::regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod date;
pub mod describe;
pub mod segment;
pub mod text;
pub mod value;

pub use date::{extract_date, strip_dates};
pub use describe::{DescriptionNormalizer, NoisePhrases, DEFAULT_PLACEHOLDER};
pub use segment::{segment, split_clauses, Clause};
pub use text::fold;
pub use value::{find_values, first_value, parse_token, parse_values, parse_values_outside_dates, ValueToken};
