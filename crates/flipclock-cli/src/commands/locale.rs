use chrono::Local;
use clap::Subcommand;
use flipclock_core::LocaleService;

use super::open_settings;

#[derive(Subcommand)]
pub enum LocaleAction {
    /// Print the active language
    Show,
    /// Switch language; also resets the clock format to its default
    Set {
        /// Language code ("ko", "en")
        code: String,
    },
    /// Print today's date in the active language
    Date,
}

pub fn run(action: LocaleAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings()?;
    let locale = LocaleService::new(settings.clone());

    match action {
        LocaleAction::Show => {
            let code = locale.code();
            match locale.active() {
                Some(_) => println!("{code}"),
                None => println!("{code} (using {} strings)", locale.effective().code()),
            }
        }
        LocaleAction::Set { code } => {
            let change = locale.set_locale(&code)?;
            let format = settings.borrow().settings().time_format;
            println!("{} ({})", change.locale, format.as_str());
        }
        LocaleAction::Date => {
            println!("{}", locale.format_date(Local::now().date_naive()));
        }
    }
    Ok(())
}
