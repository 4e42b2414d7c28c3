use crate::services::calendar::today_jalali;

pub fn run() {
    match today_jalali() {
        Ok(today) => println!("{}", today),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
