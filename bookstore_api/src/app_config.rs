use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/authors")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::get_all_authors))
                                .route(web::post().to(handlers::add_author)),
                        )
                        .service(
                            web::resource("/{author_id}")
                                .route(web::get().to(handlers::get_author))
                                .route(web::put().to(handlers::update_author))
                                .route(web::delete().to(handlers::delete_author)),
                        ),
                )
                .service(
                    web::scope("/books")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::get_all_books))
                                .route(web::post().to(handlers::add_book)),
                        )
                        .service(
                            web::scope("/{book_id}")
                                .service(
                                    web::resource("")
                                        .route(web::get().to(handlers::get_book))
                                        .route(web::put().to(handlers::update_book))
                                        .route(web::delete().to(handlers::delete_book)),
                                )
                                .service(
                                    web::resource("/reviewers")
                                        .route(web::post().to(handlers::add_reviewer))
                                        .route(web::put().to(handlers::update_reviewer)),
                                )
                                .service(
                                    web::resource("/reviewers/{name}")
                                        .route(web::delete().to(handlers::delete_reviewer)),
                                ),
                        ),
                ),
        );
}
