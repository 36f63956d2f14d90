//! External template engine adapters.

mod cookiecutter;

pub use cookiecutter::CookiecutterEngine;
