use rocket::Route;

mod balloting;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![ping];
    routes.extend(balloting::routes());
    routes
}

/// Liveness check.
#[get("/")]
fn ping() -> &'static str {
    "pong"
}
