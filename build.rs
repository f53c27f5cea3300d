use std::env;

fn main() {
    // Configure for ATmega328P when cross-building; host builds (unit tests)
    // get no MCU flag.
    let target = env::var("TARGET").unwrap();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega328p");
    }

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");
}
