//! 堂食全流程测试
//!
//! 扫码开台 → 下单 → 后厨推进状态 → 出餐通知 → 报表

use mesa_server::core::{Config, ServerState, TransitionPolicy};
use mesa_server::utils::ManualClock;
use rust_decimal::Decimal;
use shared::models::{
    CategoryCreate, DiningTableCreate, MenuItemCreate, MenuItemUpdate, NotificationType,
    OrderCreate, OrderItemInput, OrderItemStatus, OrderStatus, StaffCreate, StaffRole,
};
use std::sync::Arc;

/// 2024-03-01 12:00:00 UTC
const NOON: i64 = 1_709_294_400_000;

fn staff(username: &str, role: StaffRole) -> StaffCreate {
    StaffCreate {
        username: username.into(),
        display_name: None,
        role,
    }
}

fn menu_item(category_id: i64, name: &str, price: f64) -> MenuItemCreate {
    MenuItemCreate {
        name: name.into(),
        description: None,
        price,
        category_id,
        image_name: Some(format!("{}.png", name.to_lowercase())),
        image_content_type: Some("image/png".into()),
        image_size: Some(2048),
        is_available: None,
        display_order: None,
    }
}

#[tokio::test]
async fn test_full_dine_in_flow() {
    let clock = Arc::new(ManualClock::new(NOON));
    let config = Config {
        transition_policy: TransitionPolicy::Strict,
        ..Config::defaults()
    };
    let state = ServerState::in_memory(config, clock.clone()).await.unwrap();
    let tasks = state.start_background_tasks().unwrap();
    assert!(state.start_background_tasks().is_err());

    // 员工、菜单、桌台
    state.staff.register(staff("chef", StaffRole::Kitchen)).await.unwrap();
    state.staff.register(staff("ana", StaffRole::Waiter)).await.unwrap();

    let mains = state
        .menu
        .create_category(CategoryCreate {
            name: "Mains".into(),
            description: None,
            display_order: Some(1),
        })
        .await
        .unwrap();
    let burger = state.menu.create_menu_item(menu_item(mains.id, "Burger", 5.0)).await.unwrap();
    let steak = state.menu.create_menu_item(menu_item(mains.id, "Steak", 10.0)).await.unwrap();

    let table = state
        .tables
        .create_table(DiningTableCreate {
            table_number: 12,
            capacity: Some(4),
            status: None,
        })
        .await
        .unwrap();
    state.tables.assign(table.id, "ana", "2024-03-01").await.unwrap();

    // 扫码开台并下单
    let session = state.customers.start_session(table.id, &table.qr_code).await.unwrap();
    let order = state
        .customers
        .place_order(
            &session.session_id,
            OrderCreate {
                table_id: table.id,
                customer_name: Some("Marta".into()),
                special_instructions: None,
                items: vec![
                    OrderItemInput {
                        menu_item_id: burger.id,
                        quantity: 2,
                        special_instructions: None,
                    },
                    OrderItemInput {
                        menu_item_id: steak.id,
                        quantity: 1,
                        special_instructions: Some("medium rare".into()),
                    },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert!(state.tables.has_active_orders(table.id).await.unwrap());

    // 改价不影响已下单价格
    state
        .menu
        .update_menu_item(
            burger.id,
            MenuItemUpdate {
                price: Some(7.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // 后厨
    let queue = state.orders.incoming_orders().await.unwrap();
    assert_eq!(queue.len(), 1);

    state.orders.update_status(order.id(), OrderStatus::Confirmed).await.unwrap();
    state.orders.update_status(order.id(), OrderStatus::InProgress).await.unwrap();
    let first_item = order.items[0].id;
    state
        .orders
        .update_item_status(order.id(), first_item, OrderItemStatus::InPreparation)
        .await
        .unwrap();

    // 严格策略：不允许回退
    let err = state
        .orders
        .update_status(order.id(), OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    clock.advance_secs(630);
    let ready = state.orders.update_status(order.id(), OrderStatus::Ready).await.unwrap();
    assert_eq!(ready.order.updated_at, Some(NOON + 630_000));
    let burger_line = ready
        .items
        .iter()
        .find(|i| i.menu_item_id == burger.id)
        .unwrap();
    assert_eq!(burger_line.price, 5.0);
    assert_eq!(burger_line.image_content_type.as_deref(), Some("image/png"));

    let view = state
        .customers
        .order_status(order.id(), &session.session_id)
        .await
        .unwrap();
    assert_eq!(view.estimated_time, "Ready for pickup");

    state
        .customers
        .request_assistance(table.id, &session.session_id, "more napkins")
        .await
        .unwrap();

    // 关闭后台任务：worker 排空通道后落库
    tasks.shutdown().await;

    let chef = state.dispatcher.pending_for_user("chef").await.unwrap();
    assert_eq!(chef.len(), 1);
    assert_eq!(chef[0].notification_type, NotificationType::NewOrder);
    assert_eq!(chef[0].reference_id, Some(order.id()));

    let ana = state.dispatcher.pending_for_user("ana").await.unwrap();
    assert_eq!(ana.len(), 2);
    assert_eq!(ana[0].notification_type, NotificationType::OrderReady);
    assert_eq!(ana[1].notification_type, NotificationType::TableRequest);
    state.dispatcher.mark_read(ana[0].id).await.unwrap();
    assert_eq!(state.dispatcher.pending_for_user("ana").await.unwrap().len(), 1);

    // 报表
    let sales = state.reports.daily_sales("2024-03-01").await.unwrap();
    assert_eq!(sales.total_orders, 1);
    assert_eq!(sales.total_revenue, Decimal::new(20, 0));
    assert_eq!(sales.total_items_sold, 3);
    assert_eq!(sales.hourly_sales[0].hour, 12);

    let prep = state.reports.preparation_time("2024-03-01", "2024-03-01").await.unwrap();
    assert_eq!(prep.overall_average_secs, 630);

    let popular = state.reports.popular_items("2024-03-01", "2024-03-01", Some(1)).await.unwrap();
    assert_eq!(popular.items.len(), 1);
    assert_eq!(popular.items[0].name, "Burger");
    assert_eq!(popular.items[0].percentage_of_orders, Decimal::new(200, 0));

    let kitchen = state.reports.kitchen_statistics().await.unwrap();
    assert_eq!(kitchen.completed_orders, 1);

    // 送达后桌台可删除
    state.orders.update_status(order.id(), OrderStatus::Delivered).await.unwrap();
    state.tables.delete_table(table.id).await.unwrap();
    assert!(state.sessions.get(&session.session_id).is_none());
}
