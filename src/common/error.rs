use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Movimentação de estoque não encontrada")]
    MovementNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Item de pedido não encontrado")]
    OrderItemNotFound,

    #[error("Documento financeiro não encontrado")]
    DocumentNotFound,

    #[error("Conta financeira não encontrada")]
    AccountNotFound,

    #[error("Categoria de despesa não encontrada")]
    CategoryNotFound,

    // Já existe documento gerado para a mesma origem (pedido/entrada) e tipo.
    #[error("Já existe um documento para esta origem")]
    DuplicateOrigin,

    #[error("Quantidade inválida: entradas exigem quantidade positiva")]
    InvalidQuantity,

    #[error("SKU já cadastrado: {0}")]
    SkuAlreadyExists(String),

    #[error("Categoria de despesa já cadastrada: {0}")]
    CategoryNameAlreadyExists(String),

    #[error("Categoria inválida: o pai deve ser uma categoria raiz")]
    CategoryParentNotRoot,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}
