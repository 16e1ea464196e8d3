//! A login page object driven by the in-memory mock driver.
//!
//! Run as follows:
//!
//!     cargo run --example login_page

use std::time::Duration;

use pageobject_sync::driver::mock::{MockDriver, MockNode};
use pageobject_sync::prelude::*;

struct LoginPage<D: Driver> {
    page: Page<D>,
    username: Element,
    password: Element,
    submit: Element,
    spinner: Element,
    greeting: Element,
}

impl<D: Driver> LoginPage<D> {
    fn new(page: Page<D>) -> Self {
        LoginPage {
            page,
            username: Element::new(By::Id, "username"),
            password: Element::new(By::Id, "password"),
            submit: Element::new(By::Css, "button[type='submit']").with_remark("login button"),
            spinner: Element::new(By::ClassName, "spinner"),
            greeting: Element::new(By::Id, "greeting").with_timeout(Duration::from_secs(5)),
        }
    }

    fn login(&self, user: &str, password: &str) -> PageResult<String> {
        self.username.bind(&self.page).clear()?.input(user)?;
        self.password.bind(&self.page).clear()?.input(password)?;
        self.submit.bind(&self.page).click()?;
        self.spinner.bind(&self.page).wait_invisible(true)?;
        self.greeting.bind(&self.page).visible_text()
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("username")));
    driver.add(MockNode::new(Locator::id("password")));
    driver.add(MockNode::new(Locator::css("button[type='submit']")).appears_after(Duration::from_millis(300)));
    driver.add(MockNode::new(Locator::class_name("spinner")).vanishes_after(Duration::from_millis(800)));
    driver.add(
        MockNode::new(Locator::id("greeting"))
            .text("Welcome back, alice")
            .appears_after(Duration::from_secs(1)),
    );

    let login = LoginPage::new(Page::new(driver).with_policy(WaitPolicy::default().with_timeout(Duration::from_secs(3))));
    let greeting = login.login("alice", "secret")?;
    assert_eq!(greeting, "Welcome back, alice");
    println!("{}", greeting);

    Ok(())
}
