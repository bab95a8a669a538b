//! Installation form scenarios

use futures::future::BoxFuture;

use chargepoint_common::serial::EquivalenceClass;

use super::{ensure, Scenario, ScenarioContext, Suite};
use crate::error::E2eResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("ui-add-valid-serial", Suite::Ui, &["add", "smoke"], add_valid),
        Scenario::new(
            "ui-add-several-delete-one",
            Suite::Ui,
            &["add", "delete"],
            add_several_delete_one,
        ),
        Scenario::new(
            "ui-duplicate-listed-once",
            Suite::Ui,
            &["add", "validation"],
            duplicate_listed_once,
        ),
        Scenario::new("ui-delete-serial", Suite::Ui, &["delete", "smoke"], delete_serial),
        Scenario::new(
            "ui-empty-input-disables-add",
            Suite::Ui,
            &["validation"],
            empty_input_disables_add,
        ),
        Scenario::new("ui-symbols-only-not-listed", Suite::Ui, &["validation"], symbols_not_listed),
        Scenario::new("ui-too-long-not-listed", Suite::Ui, &["validation"], too_long_not_listed),
        Scenario::new("ui-too-short-not-listed", Suite::Ui, &["validation"], too_short_not_listed),
        Scenario::new("ui-delete-all-entries", Suite::Ui, &["delete", "destructive"], delete_all),
    ]
}

async fn rejected_class_not_listed(
    ctx: &ScenarioContext,
    class: EquivalenceClass,
) -> E2eResult<()> {
    let page = ctx.page()?;
    let serial = class.generate();
    page.add_serial_number(&serial).await?;
    page.verify_serial_not_in_list(&serial).await
}

fn add_valid(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serial = EquivalenceClass::Valid.generate();
        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await
    })
}

fn add_several_delete_one(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serials: Vec<String> = (0..3).map(|_| EquivalenceClass::Valid.generate()).collect();

        for serial in &serials {
            page.add_serial_number(serial).await?;
            page.verify_serial_in_list(serial).await?;
        }

        page.delete_serial(&serials[1]).await?;

        page.verify_serial_not_in_list(&serials[1]).await?;
        page.verify_serial_in_list(&serials[0]).await?;
        page.verify_serial_in_list(&serials[2]).await
    })
}

fn duplicate_listed_once(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serial = EquivalenceClass::Valid.generate();

        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await?;
        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await?;

        let count = page.get_total_serial_number_count(&serial).await?;
        ensure(count == 1, || format!("'{}' listed {} times", serial, count))
    })
}

fn delete_serial(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        let serial = EquivalenceClass::Valid.generate();

        page.add_serial_number(&serial).await?;
        page.verify_serial_in_list(&serial).await?;
        page.delete_serial(&serial).await?;
        page.verify_serial_not_in_list(&serial).await
    })
}

fn empty_input_disables_add(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        page.clear_input_field().await?;
        page.click_add().await?;
        page.is_add_button_disabled().await
    })
}

fn symbols_not_listed(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(rejected_class_not_listed(ctx, EquivalenceClass::SymbolsOnly))
}

fn too_long_not_listed(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(rejected_class_not_listed(ctx, EquivalenceClass::TooLong))
}

fn too_short_not_listed(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(rejected_class_not_listed(ctx, EquivalenceClass::TooShort))
}

fn delete_all(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let page = ctx.page()?;
        for _ in 0..2 {
            let serial = EquivalenceClass::Valid.generate();
            page.add_serial_number(&serial).await?;
            page.verify_serial_in_list(&serial).await?;
        }

        page.delete_all_serial_entries().await?;

        let left = page.get_serial_entries_count().await?;
        ensure(left == 0, || format!("{} entries left after delete all", left))
    })
}
