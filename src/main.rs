//! annoprod main entrypoint.

use annoprod::run;
use annoprod::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
