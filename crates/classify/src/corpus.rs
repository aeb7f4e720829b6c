//! Built-in labeled phrases for the fallback classifier.
//!
//! Each seed phrase is expanded with the prefixes and suffixes people tend to
//! wrap it in, so the model sees "quero ver meu saldo?" as well as "saldo".

use crate::fallback::FallbackLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPhrase {
    pub text: String,
    pub label: FallbackLabel,
}

const GREETINGS: &[&str] = &[
    "oi", "olá", "ola", "opa", "e aí", "eae", "yo", "fala ai", "fala", "salve", "alô", "alow",
    "hey", "hi", "hello", "bom dia", "boa tarde", "boa noite", "menu", "comandos", "funcoes",
    "me ajuda", "ajuda", "ajuda por favor", "socorro", "preciso de ajuda", "me salva",
    "tudo bem", "tudo certo", "como vai", "tranquilo", "beleza", "blz", "suave", "sup",
    "fala comigo", "start", "iniciar", "inicio", "vamos la", "começar", "ajudaaa", "ajudaaa!",
    "me socorre", "alguém aí?", "tem alguém aí?", "tem alguem", "está ai?", "vc está ai?",
    "vc ta ai?", "você está ai?", "você ta ai?", "olá bot", "ei bot", "oi bot", "fala bot",
    "olá ia", "assistente financeira", "e aí, beleza?", "fala zap", "fala chat", "oi zap",
    "opa assistente", "alô bot", "alow bot", "fala zapbot", "olá zapbot", "yo bot",
    "fala ai bot", "tudo bem bot", "tudo certo bot", "beleza bot", "blz bot", "suave bot",
    "fala ia", "oi assistente", "olá assistente", "bom dia bot", "boa tarde bot",
    "boa noite bot",
];

const DEBTS: &[&str] = &[
    "minhas dívidas", "minhas dividas", "ver dívidas", "ver dividas", "quais as minhas dívidas",
    "quais as minhas dividas", "tenho dívidas?", "tenho dividas?", "contas a pagar",
    "contas pra pagar", "contas pendentes", "contas atrasadas", "me mostra as dívidas",
    "me mostra as dividas", "dívidas atuais", "dividas atuais", "quais contas estão abertas?",
    "quais contas tão abertas?", "meus débitos", "meus debitos", "débitos", "debitos",
    "lista de dívidas", "lista de dividas", "dívida atrasada", "divida atrasada",
    "dívida vencida", "divida vencida", "dividas pendentes", "dívidas pendentes", "o que devo?",
    "o que eu devo?", "tô devendo?", "to devendo?", "tem dívida?", "tem divida?",
    "tem contas pra eu pagar?", "tem boleto?", "ver boleto", "meus boletos", "ver boletos",
    "contas vencidas", "contas vencidas já", "alguma dívida", "alguma divida",
    "dividas por favor", "dívidas por favor", "relatório de dívidas", "relatório de dividas",
    "relatorio de dívidas", "relatorio de dividas", "relatorio de contas",
    "relatório de contas", "quais contas estão pendentes", "quais contas faltam",
    "tem boleto vencido?", "tem algo pra vencer?", "devo algo?", "contas vencendo",
    "devo pra alguém?", "devo pra alguém", "tenho dívida?", "tenho divida?",
    "lista de pendências", "lista de pendencias", "pendências financeiras",
    "pendencias financeiras", "quais pendências", "quais pendencias", "me mostra pendencias",
    "me mostra pendências", "pendencia", "pendência",
];

const BALANCE: &[&str] = &[
    "qual o meu saldo", "meu saldo", "quanto dinheiro eu tenho", "saldo atual", "quanto sobrou",
    "quanto tenho", "saldo", "ver saldo", "quanto ainda tenho", "quanto tenho de grana",
    "money atual", "grana atual", "quanto tem na conta", "quantos reais eu tenho",
    "saldo por favor", "saldo agora", "saldo bancário", "saldo disponível",
    "quero ver meu saldo", "quanto resta", "quanto resta na conta", "quanto dinheiro resta",
    "quanto tenho sobrando", "quanto tenho pra gastar", "quanto tenho disponível",
    "saldo na conta", "quanto tenho de saldo", "saldo da conta", "me diz meu saldo",
    "mostra o saldo", "saldo total", "saldo final", "saldo zap", "saldo bot", "saldo ai",
];

const TIPS: &[&str] = &[
    "me dá uma dica financeira", "conselho de finanças", "dica para economizar", "dica de grana",
    "alguma dica de dinheiro", "dica de economia", "me dá uma dica", "quero dica financeira",
    "me aconselha", "me dá um conselho financeiro", "tem alguma dica de finanças?",
    "dica do dia", "manda uma dica", "me ensina a economizar", "dica pra guardar dinheiro",
    "dica pra juntar grana", "dica pra investir", "dica de investimento", "dica",
    "me ajuda a economizar", "tem alguma dica?", "tip financeiro", "dica de poupar",
    "me ensina a poupar", "dica de poupança", "me diz uma dica", "conselho pra economizar",
    "conselho do dia", "me fala uma dica", "me fala uma dica financeira", "alguma dica",
    "conselho?", "me aconselha ai", "algum conselho", "me da uma dica ai",
    "dica financeira ai", "tip do dia", "tip zap", "tip bot", "dica bot", "dica ai", "dica zap",
];

const BUDGET: &[&str] = &[
    "meu orçamento", "ver orçamento", "relatório de orçamento", "orcamento mensal",
    "qual meu budget", "como está meu orçamento", "orcamento", "me mostra o orçamento",
    "mostra orçamento", "orcamento atual", "quero ver meu orçamento", "meu budget",
    "como está o budget", "ver meu orçamento", "relatório do orçamento", "budget",
    "status do orçamento", "me diz o orçamento", "plano financeiro", "meu plano financeiro",
    "ver plano financeiro", "mostra meu orçamento", "orçamento detalhado",
    "orçamento resumido", "resumo do orçamento", "meu orçamento atual", "relatorio financeiro",
    "financeiro", "relatorio mensal", "resumo financeiro", "relatorio do mês",
    "relatorio de gastos", "resumo do mês",
];

/// `{}` is replaced by the seed phrase.
const GREETING_FORMS: &[&str] = &[
    "{}", "{} tudo bem?", "oi {}", "{} 👋", "{} 😃", "👋 {}", "fala {}", "menu {}",
    "comandos {}",
];
const DEBT_FORMS: &[&str] = &[
    "{}", "quero {}", "ver {}", "me diz {}", "me fala {}", "{} por favor", "tem {}?",
    "tenho {}?", "mostra {}", "{} 👀", "ver minhas {}",
];
const BALANCE_FORMS: &[&str] = &[
    "{}", "{}?", "me mostra {}", "quero saber {}", "saldo {}", "quanto tenho {}",
    "disponível {}", "tenho {}",
];
const TIP_FORMS: &[&str] = &[
    "{}", "tem {}?", "me manda {}", "quero {}", "qual {}", "dica {}", "{} por favor", "{} 🙏",
    "{} 😁", "manda uma {}",
];
const BUDGET_FORMS: &[&str] = &[
    "{}", "ver {}", "me mostra {}", "mostra {}", "{} por favor", "{} do mês", "{} desse mês",
    "{} atual", "quero saber {}", "quero {}",
];

/// The full augmented corpus, in a fixed order.
pub fn builtin_corpus() -> Vec<LabeledPhrase> {
    let groups: [(&[&str], &[&str], FallbackLabel); 5] = [
        (GREETINGS, GREETING_FORMS, FallbackLabel::Greeting),
        (DEBTS, DEBT_FORMS, FallbackLabel::ShowDebts),
        (BALANCE, BALANCE_FORMS, FallbackLabel::ShowBalance),
        (TIPS, TIP_FORMS, FallbackLabel::Tip),
        (BUDGET, BUDGET_FORMS, FallbackLabel::ShowBudget),
    ];

    let mut corpus = Vec::new();
    for (seeds, forms, label) in groups {
        for seed in seeds {
            for form in forms {
                corpus.push(LabeledPhrase {
                    text: form.replace("{}", seed),
                    label,
                });
            }
        }
    }
    corpus
}
