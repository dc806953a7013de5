use std::io::{self, Write};

pub fn show_menu() {
    println!("\n===========================================");
    println!("Real-Time Feed Dashboard");
    println!("===========================================");
    println!("Select an option:");
    println!("1. Polling Strategy Demo (threaded)");
    println!("2. Timer-Channel Strategy Demo (threaded)");
    println!("3. Async Implementation Demo");
    println!("4. Cached Market Fetch Demo (TTL)");
    println!("5. Exit");
    println!("===========================================");
    print!("Choice (1-5): ");
    let _ = io::stdout().flush();
}

pub fn get_user_choice() -> Result<u32, std::num::ParseIntError> {
    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
    input.trim().parse::<u32>()
}

pub fn wait_for_enter() {
    println!("\nPress Enter to return to menu...");
    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
}
