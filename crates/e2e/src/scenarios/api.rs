//! REST scenarios: add, delete and the full lifecycle

use futures::future::BoxFuture;
use tracing::debug;

use chargepoint_common::serial::{alphanumeric, EquivalenceClass};
use chargepoint_common::validation::MAX_SERIAL_LEN;
use chargepoint_common::{find_by_serial, ChargePoint};

use super::{ensure, Scenario, ScenarioContext, Suite};
use crate::error::{E2eError, E2eResult};

/// Serial number used by the fixed-value duplicate scenario
pub const LITERAL_SERIAL: &str = "SN-AB12CD34";

/// Well-formed path segment that is not a valid identifier
pub const MALFORMED_ID: &str = "invalid-serial-number";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("api-add-valid-charge-point", Suite::Api, &["add", "smoke"], add_valid),
        Scenario::new(
            "api-add-duplicate-serial",
            Suite::Api,
            &["add", "validation"],
            add_duplicate,
        ),
        Scenario::new("api-add-empty-serial", Suite::Api, &["add", "validation"], add_empty),
        Scenario::new(
            "api-add-without-serial-field",
            Suite::Api,
            &["add", "validation"],
            add_without_body,
        ),
        Scenario::new(
            "api-add-too-short-serial",
            Suite::Api,
            &["add", "validation"],
            add_too_short,
        ),
        Scenario::new("api-add-too-long-serial", Suite::Api, &["add", "validation"], add_too_long),
        Scenario::new(
            "api-add-without-content-type",
            Suite::Api,
            &["add", "validation"],
            add_without_headers,
        ),
        Scenario::new(
            "api-add-symbols-only-serial",
            Suite::Api,
            &["add", "validation"],
            add_symbols_only,
        ),
        Scenario::new(
            "api-add-length-boundary",
            Suite::Api,
            &["add", "validation", "boundary"],
            add_length_boundary,
        ),
        Scenario::new(
            "api-add-literal-serial-twice",
            Suite::Api,
            &["add", "validation"],
            add_literal_twice,
        ),
        Scenario::new(
            "api-delete-valid-charge-point",
            Suite::Api,
            &["delete", "smoke"],
            delete_valid,
        ),
        Scenario::new("api-delete-already-deleted", Suite::Api, &["delete"], delete_twice),
        Scenario::new(
            "api-delete-malformed-id",
            Suite::Api,
            &["delete", "validation"],
            delete_malformed_id,
        ),
        Scenario::new("api-delete-empty-id", Suite::Api, &["delete"], delete_empty_id),
        Scenario::new("api-lifecycle", Suite::Api, &["e2e", "smoke"], lifecycle),
    ]
}

/// Create a charge point with a fresh valid serial, expecting 201
async fn create_valid(ctx: &ScenarioContext) -> E2eResult<ChargePoint> {
    let serial = EquivalenceClass::Valid.generate();
    let response = ctx.api.add_charge_point(&serial).await?;
    response.expect_status("add charge point", 201)?;
    response.json()
}

async fn expect_rejected(ctx: &ScenarioContext, class: EquivalenceClass) -> E2eResult<()> {
    let serial = class.generate();
    debug!("Submitting {} serial ({} chars)", class, serial.chars().count());
    ctx.api
        .add_charge_point(&serial)
        .await?
        .expect_status(&format!("add {} serial", class), 400)?;
    Ok(())
}

fn add_valid(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let serial = EquivalenceClass::Valid.generate();
        let response = ctx.api.add_charge_point(&serial).await?;
        response.expect_status("add valid charge point", 201)?;

        let created: ChargePoint = response.json()?;
        ensure(created.serial_number == serial, || {
            format!("response echoes '{}', sent '{}'", created.serial_number, serial)
        })
    })
}

fn add_duplicate(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let serial = EquivalenceClass::Valid.generate();
        ctx.api
            .add_charge_point(&serial)
            .await?
            .expect_status("first add", 201)?;
        ctx.api
            .add_charge_point(&serial)
            .await?
            .expect_status("duplicate add", 400)?;
        Ok(())
    })
}

fn add_empty(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(expect_rejected(ctx, EquivalenceClass::Empty))
}

fn add_without_body(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        ctx.api
            .add_charge_point_without_body()
            .await?
            .expect_status("add without serialNumber", 400)?;
        Ok(())
    })
}

fn add_too_short(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(expect_rejected(ctx, EquivalenceClass::TooShort))
}

fn add_too_long(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(expect_rejected(ctx, EquivalenceClass::TooLong))
}

fn add_without_headers(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let serial = EquivalenceClass::Valid.generate();
        ctx.api
            .add_charge_point_without_headers(&serial)
            .await?
            .expect_status("add without Content-Type", 400)?;
        Ok(())
    })
}

fn add_symbols_only(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(expect_rejected(ctx, EquivalenceClass::SymbolsOnly))
}

fn add_length_boundary(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let longest = alphanumeric(MAX_SERIAL_LEN);
        let response = ctx.api.add_charge_point(&longest).await?;
        response.expect_status(&format!("add {}-char serial", MAX_SERIAL_LEN), 201)?;
        let created: ChargePoint = response.json()?;

        ctx.api
            .add_charge_point(&alphanumeric(MAX_SERIAL_LEN + 1))
            .await?
            .expect_status(&format!("add {}-char serial", MAX_SERIAL_LEN + 1), 400)?;

        ctx.api
            .delete_charge_point(created.id.as_str())
            .await?
            .expect_status("clean up boundary charge point", 204)?;
        Ok(())
    })
}

fn add_literal_twice(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        // Leftovers from an earlier interrupted run would turn the first add into a duplicate
        if let Some(stale) = find_by_serial(&ctx.api.list_charge_points().await?, LITERAL_SERIAL) {
            ctx.api.delete_charge_point(stale.id.as_str()).await?;
        }

        let response = ctx.api.add_charge_point(LITERAL_SERIAL).await?;
        response.expect_status("add literal serial", 201)?;
        let created: ChargePoint = response.json()?;
        ensure(created.serial_number == LITERAL_SERIAL, || {
            format!("response echoes '{}'", created.serial_number)
        })?;

        ctx.api
            .add_charge_point(LITERAL_SERIAL)
            .await?
            .expect_status("add literal serial again", 400)?;

        ctx.api
            .delete_charge_point(created.id.as_str())
            .await?
            .expect_status("clean up literal charge point", 204)?;
        Ok(())
    })
}

fn delete_valid(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let created = create_valid(ctx).await?;
        ctx.api
            .delete_charge_point(created.id.as_str())
            .await?
            .expect_status("delete charge point", 204)?;
        Ok(())
    })
}

fn delete_twice(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let created = create_valid(ctx).await?;
        ctx.api
            .delete_charge_point(created.id.as_str())
            .await?
            .expect_status("first delete", 204)?;
        ctx.api
            .delete_charge_point(created.id.as_str())
            .await?
            .expect_status("second delete", 404)?;
        Ok(())
    })
}

fn delete_malformed_id(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        ctx.api
            .delete_charge_point(MALFORMED_ID)
            .await?
            .expect_status("delete with malformed id", 400)?;
        Ok(())
    })
}

fn delete_empty_id(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        ctx.api
            .delete_charge_point("")
            .await?
            .expect_status("delete with empty id", 404)?;
        Ok(())
    })
}

fn lifecycle(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let serial = EquivalenceClass::Valid.generate();
        ctx.api
            .add_charge_point(&serial)
            .await?
            .expect_status("add", 201)?;

        let listed = ctx.api.list_charge_points().await?;
        let id = find_by_serial(&listed, &serial)
            .map(|cp| cp.id.clone())
            .ok_or_else(|| {
                E2eError::AssertionFailed(format!("'{}' missing from listing", serial))
            })?;

        ctx.api
            .delete_charge_point(id.as_str())
            .await?
            .expect_status("delete", 204)?;

        let listed = ctx.api.list_charge_points().await?;
        ensure(find_by_serial(&listed, &serial).is_none(), || {
            format!("'{}' still listed after delete", serial)
        })
    })
}
