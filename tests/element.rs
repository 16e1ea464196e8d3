use std::time::{Duration, Instant};

use pageobject_sync::driver::mock::{MockDriver, MockNode};
use pageobject_sync::prelude::*;
use pageobject_sync::{Action, Point, Rect};

fn fast_page(driver: MockDriver) -> Page<MockDriver> {
    Page::new(driver).with_policy(WaitPolicy::new(
        Duration::from_millis(300),
        Duration::from_millis(20),
        true,
    ))
}

#[test]
fn element_appearing_before_the_deadline_is_found() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("submit")).appears_after(Duration::from_secs(1)));
    let page = Page::new(driver);
    let submit = Element::new(By::Id, "submit");

    let start = Instant::now();
    let outcome = submit.bind(&page).timeout(Duration::from_secs(2)).wait_present().unwrap();
    let elapsed = start.elapsed();
    assert!(outcome.is_found());
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
    assert_eq!(submit.wait_timeout(), Some(Duration::from_secs(2)));
    assert_eq!(page.wait_timeout(), Some(Duration::from_secs(2)));
}

#[test]
fn return_false_times_out_without_raising() {
    let page = Page::new(MockDriver::new());
    let ghost = Element::new(By::Id, "ghost");

    let start = Instant::now();
    let outcome = ghost.bind(&page).timeout(Duration::from_secs(1)).reraise(false).wait_present().unwrap();
    let elapsed = start.elapsed();
    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_millis(1500));
}

#[test]
fn raise_never_fires_early() {
    let page = fast_page(MockDriver::new());
    let ghost = Element::new(By::Id, "ghost").with_remark("ghost button");

    let start = Instant::now();
    let err = ghost.bind(&page).wait_visible().unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(300));
    match err {
        PageError::Timeout {
            target,
            condition,
            timeout,
        } => {
            assert_eq!(target, "ghost button");
            assert_eq!(condition, "visible");
            assert_eq!(timeout, Duration::from_millis(300));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn index_past_the_last_match_is_not_found() {
    let driver = MockDriver::new();
    for _ in 0..3 {
        driver.add(MockNode::new(Locator::class_name("row")));
    }
    let page = fast_page(driver);
    let sixth = Element::new(By::ClassName, "row").with_index(5);

    assert!(sixth.bind(&page).find_now().unwrap_err().is_not_found());
    assert!(sixth.bind(&page).reraise(false).wait_present().unwrap().is_timed_out());
    assert!(sixth.bind(&page).wait_present().unwrap_err().is_timeout());
    assert!(sixth.bind(&page).wait_absent().unwrap());
    assert!(Element::new(By::ClassName, "row").with_index(2).bind(&page).is_present().unwrap());
}

#[test]
fn stale_handle_recovers_transparently() {
    let driver = MockDriver::new();
    let id = driver.add(MockNode::new(Locator::id("title")).text("Inbox"));
    let page = fast_page(driver);
    let title = Element::new(By::Id, "title");

    assert_eq!(title.bind(&page).text().unwrap(), "Inbox");
    let first = title.cached_handle().unwrap();

    page.driver().invalidate(id);
    assert_eq!(title.bind(&page).text().unwrap(), "Inbox");
    let second = title.cached_handle().unwrap();
    assert_ne!(first, second);
}

#[test]
fn state_wait_falls_back_to_the_locator() {
    let driver = MockDriver::new();
    let id = driver.add(MockNode::new(Locator::id("save")).disabled());
    let page = fast_page(driver);
    let save = Element::new(By::Id, "save");

    assert!(save.bind(&page).wait_present().unwrap().is_found());
    page.driver().invalidate(id);
    page.driver().update(id, |node| node.enabled = true);

    let outcome = save.bind(&page).wait_clickable().unwrap();
    assert_eq!(outcome.found(), save.cached_handle());
    assert_eq!(save.bind(&page).click().unwrap().element().remark(), "save");
    assert_eq!(page.driver().node(id).clicks, 1);
}

#[test]
fn inverse_wait_accepts_a_vanished_element() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::class_name("spinner")).vanishes_after(Duration::from_millis(100)));
    let page = fast_page(driver);
    let spinner = Element::new(By::ClassName, "spinner");

    assert!(spinner.bind(&page).wait_visible().unwrap().is_found());
    let outcome = spinner.bind(&page).wait_invisible(true).unwrap();
    assert_eq!(outcome, WaitOutcome::Absent);
    assert_eq!(spinner.cached_handle(), None);
}

#[test]
fn inverse_wait_on_a_rerendered_element_rechecks_the_locator() {
    let driver = MockDriver::new();
    let id = driver.add(MockNode::new(Locator::class_name("spinner")));
    let page = fast_page(driver);
    let spinner = Element::new(By::ClassName, "spinner");

    let before = spinner.bind(&page).wait_visible().unwrap().found();
    assert!(before.is_some());
    page.driver().invalidate(id);

    let outcome = spinner.bind(&page).reraise(false).wait_invisible(true).unwrap();
    assert!(outcome.is_timed_out());
    let outcome = spinner.bind(&page).reraise(false).wait_unclickable(true).unwrap();
    assert!(outcome.is_timed_out());
    assert!(spinner.bind(&page).wait_invisible(true).unwrap_err().is_timeout());
}

#[test]
fn inverse_wait_without_tolerance_times_out_on_absence() {
    let page = fast_page(MockDriver::new());
    let spinner = Element::new(By::ClassName, "spinner");
    let outcome = spinner.bind(&page).reraise(false).wait_invisible(false).unwrap();
    assert!(outcome.is_timed_out());
    let outcome = spinner.bind(&page).wait_unclickable(true).unwrap();
    assert_eq!(outcome, WaitOutcome::Absent);
}

#[test]
fn read_only_queries_are_idempotent() {
    let driver = MockDriver::new();
    driver.add(
        MockNode::new(Locator::id("badge"))
            .text("3")
            .attribute("aria-label", "3 unread")
            .css("color", "red")
            .rect(Rect::new(10.0, 20.0, 30.0, 40.0)),
    );
    let page = fast_page(driver);
    let badge = Element::new(By::Id, "badge");
    let bound = badge.bind(&page);

    for _ in 0..2 {
        assert_eq!(bound.text().unwrap(), "3");
        assert!(bound.is_visible().unwrap());
        assert!(bound.is_clickable().unwrap());
        assert!(!bound.is_selected().unwrap());
        assert_eq!(bound.attribute("aria-label").unwrap().as_deref(), Some("3 unread"));
        assert_eq!(bound.css_value("color").unwrap(), "red");
        assert_eq!(bound.center().unwrap(), Point::new(25, 40));
    }
}

#[test]
fn dynamic_element_fails_fast_until_set() {
    let page = fast_page(MockDriver::new());
    page.driver().add(MockNode::new(Locator::xpath("//li[2]")));
    let mut item = Element::dynamic();

    let start = Instant::now();
    let err = item.bind(&page).wait_present().unwrap_err();
    assert!(matches!(err, PageError::Configuration(_)));
    assert!(start.elapsed() < Duration::from_millis(100));

    item.set(Locator::xpath("//li[2]"));
    assert!(item.bind(&page).is_present().unwrap());
}

#[test]
fn keyboard_helpers_type_into_the_field() -> PageResult<()> {
    let driver = MockDriver::new();
    let id = driver.add(MockNode::new(Locator::name("q")));
    let page = fast_page(driver);
    let query = Element::new(By::Name, "q");

    query.bind(&page).input("rust")?.backspace(2)?.tab(1)?;
    assert_eq!(page.driver().node(id).typed, format!("rust{}{}", Keys::Backspace.repeat(2), Keys::Tab.as_str()));
    query.bind(&page).clear()?.select_all()?;
    assert_eq!(page.driver().node(id).typed, Keys::chord(Keys::primary_modifier(), "a"));
    Ok(())
}

#[test]
fn queued_actions_share_the_page_chain() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("card")));
    driver.add(MockNode::new(Locator::id("bin")));
    let page = fast_page(driver);
    let card = Element::new(By::Id, "card");
    let bin = Element::new(By::Id, "bin");

    card.bind(&page).drag_and_drop(&bin).unwrap();
    bin.bind(&page).double_click().unwrap();
    assert_eq!(page.queued_actions(), 3);

    card.bind(&page).perform().unwrap();
    let performed = page.driver().performed_actions();
    assert_eq!(performed.len(), 3);
    assert!(matches!(performed[0], Action::ClickAndHold(Some(_))));
    assert!(matches!(performed[1], Action::Release(Some(_))));
    assert_eq!(page.queued_actions(), 0);
}

#[test]
fn select_dropdown_by_text() {
    let driver = MockDriver::new();
    let select = driver.add(MockNode::new(Locator::id("size")).tag("select"));
    let options: Vec<_> = ["Small", "Large"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            driver.add(
                MockNode::new(Locator::tag("option"))
                    .child_of(select)
                    .tag("option")
                    .text(*text)
                    .attribute("index", i.to_string())
                    .checkable(),
            )
        })
        .collect();
    let page = fast_page(driver);
    let size = Element::new(By::Id, "size");

    size.bind(&page).select_by_visible_text("Large").unwrap();
    assert!(page.driver().node(options[1]).selected);
    assert_eq!(size.bind(&page).all_selected_options().unwrap().len(), 1);
    assert_eq!(size.bind(&page).options().unwrap().len(), 2);
}

#[test]
fn swipe_brings_a_scrolled_element_into_view() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("footer")).scrolls().rect(Rect::new(0.0, 3000.0, 200.0, 40.0)));
    let page = fast_page(driver);
    let footer = Element::new(By::Id, "footer");

    footer.bind(&page).swipe_by(&SwipeOptions::default()).unwrap();
    let swipes = page.driver().swipes();
    assert_eq!(swipes.len(), 2);
    assert_eq!(swipes[0].start, Point::new(500, 1500));
    assert_eq!(swipes[0].end, Point::new(500, 500));
    assert!(footer.bind(&page).is_viewable().unwrap());
}

#[test]
fn swipe_adjusts_a_partially_visible_element() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("footer")).scrolls().rect(Rect::new(0.0, 2980.0, 200.0, 40.0)));
    let page = fast_page(driver);
    let footer = Element::new(By::Id, "footer");

    footer.bind(&page).swipe_by(&SwipeOptions::default()).unwrap();
    let swipes = page.driver().swipes();
    assert_eq!(swipes.len(), 2);
    assert_eq!(swipes[1].end, Point::new(500, 1400));
    assert_eq!(footer.bind(&page).border().unwrap().bottom, 1920);
}

#[test]
fn swipe_gives_up_at_the_cap() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("far")).scrolls().rect(Rect::new(0.0, 100_000.0, 200.0, 40.0)));
    let page = fast_page(driver);
    let far = Element::new(By::Id, "far");

    let options = SwipeOptions::default().with_max_swipe(3);
    let err = far.bind(&page).flick_by(&options).unwrap_err();
    assert!(matches!(err, PageError::SwipeLimit { attempts: 3, .. }));
    assert_eq!(page.driver().flicks().len(), 3);
}

#[test]
fn frame_switch_waits_for_the_frame() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::css("iframe#pay")).frame().appears_after(Duration::from_millis(50)));
    let page = fast_page(driver);
    let frame = Element::new(By::Css, "iframe#pay");

    assert!(frame.bind(&page).switch_to_frame().unwrap());
    assert!(page.driver().with_page(|p| p.frame.is_some()));
}

#[test]
fn wait_text_matches_a_pattern() {
    let driver = MockDriver::new();
    let id = driver.add(MockNode::new(Locator::id("status")).text("pending"));
    driver.after(Duration::from_millis(80), move |state| state.node_mut(id).text = "done in 3s".to_string());
    let page = fast_page(driver);
    let status = Element::new(By::Id, "status");

    let outcome = status.bind(&page).wait_text(TextMatch::regex(r"^done in \d+s$").unwrap()).unwrap();
    assert_eq!(outcome.found().as_deref(), Some("done in 3s"));
}
