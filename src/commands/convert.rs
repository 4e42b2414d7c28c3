use crate::error::Result;
use crate::services::calendar::{gregorian_to_jalali, jalali_to_gregorian};

pub fn run(input: &str) {
    match convert_date(input) {
        Ok(converted) => println!("{}", converted),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// An 8-digit input is a Gregorian key; anything else is read as Jalali
pub fn convert_date(input: &str) -> Result<String> {
    let input = input.trim();
    if input.len() == 8 && input.bytes().all(|b| b.is_ascii_digit()) {
        gregorian_to_jalali(input)
    } else {
        jalali_to_gregorian(input)
    }
}
