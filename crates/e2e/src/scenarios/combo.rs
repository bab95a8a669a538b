//! Cross-surface scenarios: act through the form, check through the API

use futures::future::BoxFuture;

use chargepoint_common::find_by_serial;
use chargepoint_common::serial::EquivalenceClass;

use super::{ensure, Scenario, ScenarioContext, Suite};
use crate::error::E2eResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "combo-ui-add-visible-in-api",
            Suite::Combo,
            &["add", "smoke"],
            ui_add_visible_in_api,
        ),
        Scenario::new(
            "combo-ui-delete-gone-from-api",
            Suite::Combo,
            &["delete"],
            ui_delete_gone_from_api,
        ),
    ]
}

fn ui_add_visible_in_api(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serial = EquivalenceClass::Valid.generate();

        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await?;

        let listed = ctx.api.list_charge_points().await?;
        let found = find_by_serial(&listed, &serial);
        ensure(found.is_some_and(|cp| !cp.id.as_str().is_empty()), || {
            format!("'{}' has no id in the API listing", serial)
        })
    })
}

fn ui_delete_gone_from_api(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serial = EquivalenceClass::Valid.generate();

        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await?;
        page.delete_serial(&serial).await?;
        page.verify_serial_not_in_list(&serial).await?;

        let listed = ctx.api.list_charge_points().await?;
        ensure(find_by_serial(&listed, &serial).is_none(), || {
            format!("'{}' still returned by the API", serial)
        })
    })
}
