use kursverwaltung_api_types::parse_calendar_date;
use std::io::Write;
use std::str::FromStr;

/// Ask the user interactively for some single-line value in the terminal. The user's input is
/// converted to type [T]. In case of an error, the error is printed and the user is queried again
/// and again with same prompt until the entered value is parsed successfully.
pub fn query_user<T: FromStr>(prompt: &str) -> T
where
    <T as FromStr>::Err: std::fmt::Display,
{
    query_user_and_check(prompt, |_| Ok::<(), &str>(()))
}

/// Ask the user interactively for some single-line value in the terminal. The user's input is
/// converted to type [T] and validated with the provided validation_function. In case of a parsing
/// error or validation error, the error is printed and the user is queried again and again with
/// same prompt until the entered value is valid.
pub fn query_user_and_check<T: FromStr, F, E>(prompt: &str, validation_function: F) -> T
where
    <T as FromStr>::Err: std::fmt::Display,
    F: Fn(&T) -> Result<(), E>,
    E: std::fmt::Display,
{
    loop {
        println!("{}:", prompt);
        print!("> ");
        std::io::stdout().flush().unwrap();
        let mut user_input = String::new();
        if let Err(e) = std::io::stdin().read_line(&mut user_input) {
            println!("Error: {}", e);
            continue;
        }
        let value = match user_input.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        match validation_function(&value) {
            Ok(()) => return value,
            Err(e) => {
                println!("Error: {}", e);
            }
        }
    }
}

/// Ask the user interactively for a boolean value in the terminal (entered as y/n). In case of an
/// error, the error is printed and the user is queried again and again with same prompt until the
/// entered value is parsed successfully.
pub fn query_user_bool(prompt: &str, default: Option<bool>) -> bool {
    let value_help = match default {
        Some(true) => "J/n",
        Some(false) => "j/N",
        None => "j/n",
    };
    loop {
        println!("{} [{}]", prompt, value_help);
        print!("> ");
        std::io::stdout().flush().unwrap();
        let mut user_input = String::new();
        if let Err(e) = std::io::stdin().read_line(&mut user_input) {
            println!("Error: {}", e);
            continue;
        }
        match parse_yes_no(&user_input) {
            Some(value) => return value,
            None if user_input.trim().is_empty() => {
                if let Some(default) = default {
                    return default;
                }
            }
            None => {}
        }
        println!("Error: unknown option. Please enter 'j' or 'n'.");
    }
}

fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "j" | "ja" | "y" | "yes" => Some(true),
        "n" | "nein" | "no" => Some(false),
        _ => None,
    }
}

/// Ask for an optional value. An empty input is taken as "no value".
pub fn query_user_optional<T: FromStr>(prompt: &str) -> Option<T>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    query_user::<Optional<T>>(&format!("{} (leer lassen für keinen Wert)", prompt)).0
}

/// Ask for a value, unless the user decides to keep the current one.
pub fn query_user_if_changed<T, Q>(field_label: &str, current: T, query: Q) -> T
where
    Q: FnOnce() -> T,
{
    if query_user_bool(&format!("{} ändern?", field_label), Some(false)) {
        query()
    } else {
        current
    }
}

/// A [FromStr] wrapper, which parses the empty string as `None`
pub struct Optional<T>(pub Option<T>);

impl<T: FromStr> FromStr for Optional<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self(None));
        }
        Ok(Self(Some(s.parse()?)))
    }
}

/// A calendar date entered by the user, normalized to the `YYYY-MM-DD` storage format
pub struct CalendarDate(pub String);

impl FromStr for CalendarDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_calendar_date(s)
            .or_else(|| chrono::NaiveDate::parse_from_str(s, "%d.%m.%Y").ok())
            .map(|date| Self(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| format!("Could not parse '{}' as date (YYYY-MM-DD or DD.MM.YYYY)", s))
    }
}

/// Non-empty single-line text
pub struct RequiredText(pub String);

impl FromStr for RequiredText {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Err("Value is required.")
        } else {
            Ok(Self(s.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_optional() {
        assert_eq!("".parse::<Optional<u32>>().unwrap().0, None);
        assert_eq!("12".parse::<Optional<u32>>().unwrap().0, Some(12));
        assert!("zwölf".parse::<Optional<u32>>().is_err());
        assert_eq!(
            "49.90".parse::<Optional<Decimal>>().unwrap().0,
            Some(Decimal::new(4990, 2))
        );
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!("2025-03-01".parse::<CalendarDate>().unwrap().0, "2025-03-01");
        assert_eq!("01.03.2025".parse::<CalendarDate>().unwrap().0, "2025-03-01");
        assert!("morgen".parse::<CalendarDate>().is_err());
        assert_eq!(
            "".parse::<Optional<CalendarDate>>().unwrap().0.map(|d| d.0),
            None
        );
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("J\n"), Some(true));
        assert_eq!(parse_yes_no("nein"), Some(false));
        assert_eq!(parse_yes_no(""), None);
        assert_eq!(parse_yes_no("vielleicht"), None);
        assert!("".parse::<RequiredText>().is_err());
    }
}
