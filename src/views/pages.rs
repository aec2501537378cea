//! Page bodies. Each function returns the fragment placed inside the layout.

use std::fmt::Write;

use super::escape;
use crate::database::models::{Gym, Pool, Rdv};

pub fn home(title: &str, gyms: u64, pools: u64, rdvs: u64) -> String {
    format!(
        "<h1>Welcome to {}</h1>\n\
         <p>Find a training partner at a gym or a pool near you.</p>\n\
         <ul class=\"stats\">\n\
         <li><a href=\"/gyms\">{} gyms</a></li>\n\
         <li><a href=\"/pools\">{} pools</a></li>\n\
         <li><a href=\"/rdv\">{} rendezvous</a></li>\n\
         </ul>",
        escape(title),
        gyms,
        pools,
        rdvs
    )
}

pub fn signup_form() -> String {
    "<h1>Sign up</h1>\n\
     <form method=\"post\" action=\"/process-signup\">\n\
     <label>Username <input name=\"username\" required></label>\n\
     <label>Email <input type=\"email\" name=\"email\" required></label>\n\
     <label>Password <input type=\"password\" name=\"password\" minlength=\"8\" required></label>\n\
     <button>Create account</button>\n\
     </form>"
        .to_string()
}

pub fn login_form() -> String {
    "<h1>Log in</h1>\n\
     <form method=\"post\" action=\"/process-login\">\n\
     <label>Email <input type=\"email\" name=\"email\" required></label>\n\
     <label>Password <input type=\"password\" name=\"password\" required></label>\n\
     <button>Log in</button>\n\
     </form>"
        .to_string()
}

pub fn not_found(path: &str) -> String {
    format!(
        "<h1>Page not found</h1>\n<p>Nothing lives at <code>{}</code>.</p>",
        escape(path)
    )
}

pub fn gym_list(gyms: &[Gym], can_add: bool) -> String {
    let mut html = String::from("<h1>Gyms</h1>\n");
    if can_add {
        html.push_str("<a href=\"/gyms/add\" class=\"button\">Add a gym</a>\n");
    }
    if gyms.is_empty() {
        html.push_str("<p class=\"empty\">No gyms yet.</p>");
        return html;
    }
    html.push_str("<ul class=\"gyms\">\n");
    for gym in gyms {
        let _ = writeln!(
            html,
            "<li><a href=\"/gyms/{}\">{}</a> <span class=\"city\">{}</span></li>",
            gym.id,
            escape(&gym.name),
            escape(&gym.city)
        );
    }
    html.push_str("</ul>");
    html
}

pub fn gym_form() -> String {
    "<h1>Add a gym</h1>\n\
     <form method=\"post\" action=\"/process-gym\">\n\
     <label>Name <input name=\"name\" required></label>\n\
     <label>Address <input name=\"address\" required></label>\n\
     <label>City <input name=\"city\" required></label>\n\
     <label>Description <textarea name=\"description\"></textarea></label>\n\
     <button>Save</button>\n\
     </form>"
        .to_string()
}

pub fn gym_detail(gym: &Gym, is_owner: bool) -> String {
    let mut html = format!(
        "<h1>{}</h1>\n<p class=\"address\">{}, {}</p>\n<p>{}</p>\n",
        escape(&gym.name),
        escape(&gym.address),
        escape(&gym.city),
        escape(&gym.description)
    );
    if is_owner {
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/gyms/{}/delete\"><button>Delete</button></form>",
            gym.id
        );
    }
    html
}

pub fn pool_list(pools: &[Pool], can_add: bool) -> String {
    let mut html = String::from("<h1>Pools</h1>\n");
    if can_add {
        html.push_str("<a href=\"/pools/add\" class=\"button\">Add a pool</a>\n");
    }
    if pools.is_empty() {
        html.push_str("<p class=\"empty\">No pools yet.</p>");
        return html;
    }
    html.push_str("<ul class=\"pools\">\n");
    for pool in pools {
        let _ = writeln!(
            html,
            "<li><a href=\"/pools/{}\">{}</a> <span class=\"city\">{}</span> {}m &times; {} lanes</li>",
            pool.id,
            escape(&pool.name),
            escape(&pool.city),
            pool.length_m,
            pool.lanes
        );
    }
    html.push_str("</ul>");
    html
}

pub fn pool_form() -> String {
    "<h1>Add a pool</h1>\n\
     <form method=\"post\" action=\"/process-pool\">\n\
     <label>Name <input name=\"name\" required></label>\n\
     <label>Address <input name=\"address\" required></label>\n\
     <label>City <input name=\"city\" required></label>\n\
     <label>Length (m) <input type=\"number\" name=\"length_m\" value=\"25\" min=\"1\"></label>\n\
     <label>Lanes <input type=\"number\" name=\"lanes\" value=\"6\" min=\"1\"></label>\n\
     <button>Save</button>\n\
     </form>"
        .to_string()
}

pub fn pool_detail(pool: &Pool, is_owner: bool) -> String {
    let mut html = format!(
        "<h1>{}</h1>\n<p class=\"address\">{}, {}</p>\n<p>{}m basin, {} lanes</p>\n",
        escape(&pool.name),
        escape(&pool.address),
        escape(&pool.city),
        pool.length_m,
        pool.lanes
    );
    if is_owner {
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/pools/{}/delete\"><button>Delete</button></form>",
            pool.id
        );
    }
    html
}

pub fn rdv_list(rdvs: &[Rdv], can_add: bool) -> String {
    let mut html = String::from("<h1>Rendezvous</h1>\n");
    if can_add {
        html.push_str("<a href=\"/rdv/add\" class=\"button\">Organize a rendezvous</a>\n");
    }
    if rdvs.is_empty() {
        html.push_str("<p class=\"empty\">No rendezvous planned.</p>");
        return html;
    }
    html.push_str("<ul class=\"rdvs\">\n");
    for rdv in rdvs {
        let _ = writeln!(
            html,
            "<li><a href=\"/rdv/{}\">{}</a> <span class=\"sport\">{}</span> <time>{}</time></li>",
            rdv.id,
            escape(&rdv.title),
            escape(&rdv.sport),
            rdv.starts_at.format("%Y-%m-%d %H:%M")
        );
    }
    html.push_str("</ul>");
    html
}

pub fn rdv_form(gyms: &[Gym], pools: &[Pool]) -> String {
    let mut html = String::from(
        "<h1>Organize a rendezvous</h1>\n\
         <form method=\"post\" action=\"/process-rdv\">\n\
         <label>Title <input name=\"title\" required></label>\n\
         <label>Sport <input name=\"sport\" required></label>\n\
         <label>Where <select name=\"venue\" required>\n",
    );
    for gym in gyms {
        let _ = writeln!(html, "<option value=\"gym:{}\">Gym: {}</option>", gym.id, escape(&gym.name));
    }
    for pool in pools {
        let _ = writeln!(html, "<option value=\"pool:{}\">Pool: {}</option>", pool.id, escape(&pool.name));
    }
    html.push_str(
        "</select></label>\n\
         <label>When <input type=\"datetime-local\" name=\"starts_at\" required></label>\n\
         <label>Description <textarea name=\"description\"></textarea></label>\n\
         <button>Save</button>\n\
         </form>",
    );
    html
}

pub fn rdv_detail(rdv: &Rdv, venue_name: &str, can_join: bool, is_organizer: bool) -> String {
    let mut html = format!(
        "<h1>{}</h1>\n<p class=\"sport\">{}</p>\n\
         <p class=\"venue\">At <a href=\"/{}s/{}\">{}</a> on <time>{}</time></p>\n<p>{}</p>\n\
         <p class=\"participants\">{} participant(s)</p>\n",
        escape(&rdv.title),
        escape(&rdv.sport),
        rdv.venue.kind.as_str(),
        rdv.venue.id,
        escape(venue_name),
        rdv.starts_at.format("%Y-%m-%d %H:%M"),
        escape(&rdv.description),
        rdv.participants.len() + 1
    );
    if can_join {
        let _ = writeln!(
            html,
            "<form method=\"post\" action=\"/rdv/{}/join\"><button>Join</button></form>",
            rdv.id
        );
    }
    if is_organizer {
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/rdv/{}/delete\"><button>Cancel</button></form>",
            rdv.id
        );
    }
    html
}
