mod common;

use common::{TestServices, base_config};
use slircd_services::audit::LogLevel;
use slircd_services::services::ServiceEffect;
use slircd_services::state::{CapabilitySnapshot, DEBUG_ON_LEVEL};

#[tokio::test]
async fn readonly_round_trip_restores_state() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    let before = t.ctx().capabilities.snapshot();

    assert_eq!(
        t.send(&oper, "OperServ", "SET READONLY ON").await,
        vec!["Services are now in \x02read-only\x02 mode."]
    );
    assert!(t.ctx().capabilities.readonly());
    assert_eq!(
        t.send(&oper, "OperServ", "SET READONLY off").await,
        vec!["Services are now in \x02read-write\x02 mode."]
    );
    assert_eq!(t.ctx().capabilities.snapshot(), before);
    Ok(())
}

#[tokio::test]
async fn noexpire_round_trip_restores_state() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    let before = t.ctx().capabilities.snapshot();

    assert_eq!(
        t.send(&oper, "OperServ", "SET NOEXPIRE ON").await,
        vec!["Services are now in \x02no expire\x02 mode."]
    );
    assert!(t.ctx().capabilities.noexpire());
    assert_eq!(
        t.send(&oper, "OperServ", "SET NOEXPIRE OFF").await,
        vec!["Services are now in \x02expire\x02 mode."]
    );
    assert_eq!(t.ctx().capabilities.snapshot(), before);
    Ok(())
}

#[tokio::test]
async fn bad_switch_values_change_nothing() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    let before = t.ctx().capabilities.snapshot();

    assert_eq!(
        t.send(&oper, "OperServ", "SET READONLY maybe").await,
        vec!["Setting for READONLY must be \x02on\x02 or \x02off\x02."]
    );
    assert_eq!(
        t.send(&oper, "OperServ", "SET NOEXPIRE 1").await,
        vec!["Setting for NOEXPIRE must be \x02on\x02 or \x02off\x02."]
    );
    assert_eq!(t.ctx().capabilities.snapshot(), before);
    Ok(())
}

#[tokio::test]
async fn debug_zero_and_off_are_equivalent() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;

    assert_eq!(
        t.send(&oper, "OperServ", "SET DEBUG ON").await,
        vec!["Services are now in debug mode."]
    );
    assert_eq!(t.ctx().capabilities.debug_level(), DEBUG_ON_LEVEL);

    let off = t.send(&oper, "OperServ", "SET DEBUG OFF").await;
    let off_state = t.ctx().capabilities.snapshot();
    t.send(&oper, "OperServ", "SET DEBUG 7").await;
    let zero = t.send(&oper, "OperServ", "SET DEBUG 0").await;

    assert_eq!(off, vec!["Services are now in non-debug mode."]);
    assert_eq!(off, zero);
    assert_eq!(t.ctx().capabilities.snapshot(), off_state);
    assert!(!t.ctx().capabilities.debug_enabled());
    Ok(())
}

#[tokio::test]
async fn debug_numeric_level_is_exact() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;

    assert_eq!(
        t.send(&oper, "OperServ", "SET DEBUG 5").await,
        vec!["Services are now in debug mode (level 5)."]
    );
    assert_eq!(t.ctx().capabilities.debug_level(), 5);
    Ok(())
}

#[tokio::test]
async fn debug_rejects_negative_and_text() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    t.send(&oper, "OperServ", "SET DEBUG 3").await;

    for bad in ["-1", "abc", "2x"] {
        assert_eq!(
            t.send(&oper, "OperServ", &format!("SET DEBUG {bad}")).await,
            vec!["Setting for DEBUG must be \x02ON\x02, \x02OFF\x02, or a positive number."]
        );
    }
    assert_eq!(t.ctx().capabilities.debug_level(), 3);
    Ok(())
}

#[tokio::test]
async fn mutations_are_audited_with_the_exact_setting() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;

    t.send(&oper, "OperServ", "SET DEBUG 5").await;
    t.send(&oper, "OperServ", "SET READONLY ON").await;
    t.send(&oper, "OperServ", "SET DEBUG nope").await;

    let entries = t.ctx().audit.entries();
    let details: Vec<_> = entries.iter().map(|e| e.detail.as_str()).collect();
    assert_eq!(details, vec!["DEBUG 5", "READONLY ON"]);
    assert!(entries.iter().all(|e| e.level == LogLevel::Admin));
    assert_eq!(entries[0].command, "OperServ/SET");
    assert_eq!(entries[0].account.as_deref(), Some("oper"));
    Ok(())
}

#[tokio::test]
async fn list_reports_flags_and_is_audited() -> anyhow::Result<()> {
    let mut config = base_config();
    config.capabilities.readonly = true;
    config.capabilities.debug = 2;
    let t = TestServices::with_config(config)?;
    let oper = t.oper("oper")?;

    assert_eq!(
        t.ctx().capabilities.snapshot(),
        CapabilitySnapshot {
            readonly: true,
            debug: 2,
            noexpire: false,
        }
    );
    assert_eq!(
        t.send(&oper, "OperServ", "SET LIST").await,
        vec!["READONLY is enabled", "DEBUG is enabled", "NOEXPIRE is disabled"]
    );
    assert_eq!(t.ctx().audit.entries()[0].detail, "LIST");
    Ok(())
}

#[tokio::test]
async fn superadmin_toggles_session_and_broadcasts() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;

    let on = t.effects(&oper, "OperServ", "SET SUPERADMIN ON").await;
    assert!(oper.is_super_admin());
    assert!(on.contains(&ServiceEffect::Globops {
        from: "OperServ".to_string(),
        text: "oper is now a Super-Admin".to_string(),
    }));
    assert!(common::replies(&on).contains(&"You are now a SuperAdmin".to_string()));

    let off = t.effects(&oper, "OperServ", "SET SUPERADMIN OFF").await;
    assert!(!oper.is_super_admin());
    assert!(off.contains(&ServiceEffect::Globops {
        from: "OperServ".to_string(),
        text: "oper is no longer a Super-Admin".to_string(),
    }));
    assert!(common::replies(&off).contains(&"You are no longer a SuperAdmin".to_string()));
    Ok(())
}

#[tokio::test]
async fn superadmin_needs_configuration() -> anyhow::Result<()> {
    let mut config = base_config();
    config.operserv.superadmin = false;
    let t = TestServices::with_config(config)?;
    let oper = t.oper("oper")?;

    let effects = t.effects(&oper, "OperServ", "SET SUPERADMIN ON").await;
    assert_eq!(
        common::replies(&effects),
        vec!["SuperAdmin setting not enabled in services.conf"]
    );
    assert!(!effects.iter().any(|e| matches!(e, ServiceEffect::Globops { .. })));
    assert!(!oper.is_super_admin());
    assert!(t.ctx().audit.is_empty());
    Ok(())
}

#[tokio::test]
async fn option_without_setting_shows_syntax() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    assert_eq!(
        t.send(&oper, "OperServ", "SET READONLY").await,
        vec![
            "Syntax: \x02SET \x1foption\x1f \x1fsetting\x1f\x02",
            "\x02/msg OperServ HELP SET\x02 for more information.",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_option_is_named() -> anyhow::Result<()> {
    let t = TestServices::start()?;
    let oper = t.oper("oper")?;
    assert_eq!(
        t.send(&oper, "OperServ", "SET colour blue").await,
        vec!["Unknown option \x02colour\x02."]
    );
    Ok(())
}
