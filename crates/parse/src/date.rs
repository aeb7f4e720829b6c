use chrono::{Datelike, NaiveDate};
use zapfin_core::DateSpec;

re!(re_date_literal, r"\b(\d{1,2})/(\d{1,2})(?:/(\d+))?\b");
re!(re_due_day, r"(?i)\b(?:vence|vencimento|dia)(?:\s+(?:no|em|dia))*\s+(\d{1,2})\b");

/// Find the due date a message refers to.
///
/// An explicit `D/M[/Y]` literal wins. Otherwise "dia N" / "vence N" means
/// day N of the current month, or of next month when N is already behind
/// `today`.
pub fn extract_date(text: &str, today: NaiveDate) -> DateSpec {
    if let Some(spec) = try_date_literal(text) {
        return spec;
    }
    if let Some(spec) = try_due_day(text, today) {
        return spec;
    }
    DateSpec::Unspecified
}

/// Blank out every date-shaped substring so its digits are not read as money.
pub fn strip_dates(text: &str) -> String {
    let without_literals = re_date_literal().replace_all(text, " ");
    re_due_day().replace_all(&without_literals, " ").into_owned()
}

fn try_date_literal(text: &str) -> Option<DateSpec> {
    re_date_literal().captures_iter(text).find_map(|c| {
        let day: u32 = c.get(1)?.as_str().parse().ok()?;
        let month: u32 = c.get(2)?.as_str().parse().ok()?;
        let year = match c.get(3).map(|y| y.as_str()) {
            Some(y) if y.len() == 2 || y.len() == 4 => Some(expand_year(y.parse().ok()?)),
            Some(_) => return None,
            None => None,
        };
        // 2000 is a leap year, so 29/02 without a year stays valid.
        NaiveDate::from_ymd_opt(year.unwrap_or(2000), month, day)?;
        Some(DateSpec::day_month(day, month, year))
    })
}

fn try_due_day(text: &str, today: NaiveDate) -> Option<DateSpec> {
    let c = re_due_day().captures(text)?;
    let day: u32 = c.get(1)?.as_str().parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }

    let (year, month) = if day < today.day() {
        next_month(today.year(), today.month())
    } else {
        (today.year(), today.month())
    };
    let day = day.min(last_day_of_month(year, month));
    Some(DateSpec::day_month(day, month, Some(year)))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (y, m) = next_month(year, month);
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first| first.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_day_month() {
        let spec = extract_date("conta de luz 180 vence 15/09", date(2026, 10, 19));
        assert_eq!(spec, DateSpec::day_month(15, 9, None));
    }

    #[test]
    fn explicit_with_year() {
        assert_eq!(
            extract_date("boleto 01/02/27", date(2026, 10, 19)),
            DateSpec::day_month(1, 2, Some(2027))
        );
        assert_eq!(
            extract_date("boleto 01/02/2027", date(2026, 10, 19)),
            DateSpec::day_month(1, 2, Some(2027))
        );
    }

    #[test]
    fn year_must_have_two_or_four_digits() {
        assert_eq!(extract_date("boleto 15/9/202", date(2026, 10, 19)), DateSpec::Unspecified);
        assert_eq!(extract_date("boleto 15/9/20267", date(2026, 10, 19)), DateSpec::Unspecified);
        assert_eq!(strip_dates("luz 180 vence 15/9/202").trim(), "luz 180 vence");
    }

    #[test]
    fn invalid_literal_is_ignored() {
        assert_eq!(extract_date("codigo 45/13", date(2026, 10, 19)), DateSpec::Unspecified);
        assert_eq!(extract_date("29/02", date(2026, 10, 19)), DateSpec::day_month(29, 2, None));
    }

    #[test]
    fn passed_day_rolls_to_next_month() {
        let spec = extract_date("vence dia 5", date(2026, 10, 20));
        assert_eq!(spec, DateSpec::day_month(5, 11, Some(2026)));
    }

    #[test]
    fn upcoming_day_stays_in_month() {
        let spec = extract_date("internet vence dia 25", date(2026, 10, 20));
        assert_eq!(spec, DateSpec::day_month(25, 10, Some(2026)));
    }

    #[test]
    fn today_is_not_rolled() {
        let spec = extract_date("vence dia 20", date(2026, 10, 20));
        assert_eq!(spec, DateSpec::day_month(20, 10, Some(2026)));
    }

    #[test]
    fn december_rolls_into_january() {
        let spec = extract_date("parcela dia 5", date(2026, 12, 20));
        assert_eq!(spec, DateSpec::day_month(5, 1, Some(2027)));
    }

    #[test]
    fn rolled_day_clamps_to_short_month() {
        let spec = extract_date("aluguel vence 30", date(2026, 1, 31));
        assert_eq!(spec, DateSpec::day_month(28, 2, Some(2026)));
    }

    #[test]
    fn vence_no_dia_form() {
        let spec = extract_date("vence no dia 10", date(2026, 10, 1));
        assert_eq!(spec, DateSpec::day_month(10, 10, Some(2026)));
    }

    #[test]
    fn no_date_sentinel() {
        assert_eq!(extract_date("gastei 50 no mercado", date(2026, 10, 19)), DateSpec::Unspecified);
        assert_eq!(extract_date("dia 45", date(2026, 10, 19)), DateSpec::Unspecified);
    }

    #[test]
    fn strip_dates_blanks_literals_and_due_days() {
        let stripped = strip_dates("luz 180 vence 15/09 ou vence dia 10");
        assert!(!stripped.contains("15"));
        assert!(!stripped.contains("10"));
        assert!(stripped.contains("180"));
    }
}
