// src/bin/rebuild_stock.rs
//
// Comando administrativo: recalcula o `current_stock` de todos os produtos
// a partir do histórico de movimentações e pedidos.

use erp_backend::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, o comando não deve rodar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let total = app_state
        .stock_service
        .rebuild_all_products()
        .await
        .expect("Falha ao recalcular o estoque.");

    tracing::info!("✅ Estoque recalculado para {} produtos.", total);
}
