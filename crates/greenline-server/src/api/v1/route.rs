use actix_web::{Scope, web};

pub fn routes() -> Scope {
    web::scope("/v1")
        // Session + user management
        .service(super::auth::login)
        .service(super::user::search_page)
        .service(super::user::create)
        .service(super::user::update_password)
        .service(super::user::delete)
        // Businesses and memberships
        .service(super::business::create)
        .service(super::business::get)
        .service(super::business::update)
        .service(super::business::list_members)
        .service(super::business::add_member)
        .service(super::business::change_member_role)
        .service(super::business::remove_member)
        .service(super::business::metrics)
        .service(super::business::events)
        // Directory listings
        .service(super::directory::list)
        .service(super::directory::create)
        .service(super::directory::get)
        .service(super::directory::update)
        .service(super::directory::delete)
        .service(super::directory::publish)
        .service(super::directory::feature)
        // CRM leads
        .service(super::crm::search_page)
        .service(super::crm::create)
        .service(super::crm::get)
        .service(super::crm::update)
        .service(super::crm::delete)
        // Memory bucket
        .service(super::memory::context)
        .service(super::memory::list_facts)
        .service(super::memory::add_fact)
        .service(super::memory::delete_fact)
        .service(super::memory::add_insight)
        .service(super::memory::list_preferences)
        .service(super::memory::set_preference)
        .service(super::memory::delete_preference)
        // AI tools
        .service(super::ai::chat)
        .service(super::ai::list_skills)
        // Voice AI call logs
        .service(super::calls::search_page)
        .service(super::calls::get)
        .service(super::calls::nudge)
        // Weather alerts
        .service(super::weather::list_alerts)
        .service(super::weather::acknowledge)
        // Coupons and polls
        .service(super::coupons::list)
        .service(super::coupons::create)
        .service(super::coupons::get)
        .service(super::coupons::update)
        .service(super::coupons::activate)
        .service(super::coupons::archive)
        .service(super::polls::list)
        .service(super::polls::create)
        .service(super::polls::get)
        .service(super::polls::set_status)
        // Platform console
        .service(super::console::metrics)
        .service(super::console::audit_search)
        .service(super::console::audit_cleanup)
        .service(super::console::list_businesses)
        .service(super::console::set_tier)
        .service(super::console::set_status)
        // Vendor webhooks
        .service(super::webhooks::retell)
        .service(super::webhooks::stripe)
        // Public surface
        .service(super::public::directory_search)
        .service(super::public::capture_lead)
        .service(super::public::vote)
}
