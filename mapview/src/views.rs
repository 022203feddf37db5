use crate::app::{DetailPanel, MapView, Message, MyTab, Page};
use crate::map::MapCanvas;
use chrono::Local;
use hankkicore::api::EXAMPLE_SITUATIONS;
use hankkicore::model::category::filter_label;
use hankkicore::model::{Category, CategoryFilter, RankingPeriod, RestaurantSummary};
use hankkicore::model::review::MAX_COMMENT_CHARS;
use hankkicore::present::{
    format_timestamp, group_by_day, page_window, rating_option, score_badge, timeline::time_label,
    parse_timestamp, RATING_OPTIONS,
};
use iced::{
    widget::{button, canvas::Canvas, column, row, scrollable, text, text_input, Column, Container, Row},
    Alignment, Element, Length,
};

fn choice<'a>(label: impl Into<String>, active: bool, message: Message) -> Element<'a, Message> {
    let style = if active {
        button::primary
    } else {
        button::secondary
    };
    button(text(label.into()).size(14))
        .on_press(message)
        .padding(6)
        .style(style)
        .into()
}

fn category_row<'a>(current: CategoryFilter, on_pick: fn(CategoryFilter) -> Message) -> Element<'a, Message> {
    std::iter::once(None)
        .chain(Category::ALL.into_iter().map(Some))
        .fold(Row::new().spacing(6), |row, category| {
            row.push(choice(filter_label(category), current == category, on_pick(category)))
        })
        .into()
}

fn show_on_map<'a>(restaurant: &RestaurantSummary) -> Element<'a, Message> {
    button(text("지도에서 보기").size(12))
        .on_press(Message::ShowRestaurant(restaurant.clone()))
        .padding(4)
        .into()
}

fn notice<'a>(error: &Option<String>, loading: bool) -> Option<Element<'a, Message>> {
    if loading {
        return Some(text("불러오는 중...").size(14).into());
    }
    error
        .as_ref()
        .map(|message| text(message.clone()).size(14).into())
}

pub fn view(state: &MapView) -> Element<'_, Message> {
    let body = match state.page {
        Page::Map => map_page(state),
        Page::Rankings => rankings_page(state),
        Page::Guide => guide_page(state),
        Page::Recommend => recommend_page(state),
        Page::MyPage => my_page(state),
    };
    let nav = Page::ALL.into_iter().fold(Row::new().spacing(8), |row, page| {
        row.push(choice(page.label(), state.page == page, Message::Navigate(page)))
    });

    column![
        Container::new(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(12),
        Container::new(nav).padding(10).center_x(Length::Fill),
    ]
    .into()
}

fn map_page(state: &MapView) -> Element<'_, Message> {
    let canvas = Canvas::new(MapCanvas {
        camera: state.camera,
        restaurants: state.home.restaurants().as_slice(),
        hovered: state.home.hovered().map(|r| r.id),
        selected: state.home.selected_id(),
        user_location: state.home.user_location(),
    })
    .width(Length::Fill)
    .height(Length::Fill);

    let locate_label = if state.home.is_locating() {
        "위치 확인 중..."
    } else {
        "내 위치"
    };
    let locate = button(text(locate_label).size(14))
        .on_press_maybe((!state.home.is_locating()).then_some(Message::LocateMe))
        .padding(6);

    let metrics = state.home.metrics();
    let status = row![
        text(if state.home.is_loading() { "⏳" } else { "✔" }).size(14),
        text(&state.status).size(14),
        text(format!(
            "요청 {} · 적용 {} · 폐기 {} · 실패 {} · 중복 생략 {}",
            metrics.issued, metrics.applied, metrics.stale, metrics.failed, metrics.skipped
        ))
        .size(12),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let history_list = if state.history.is_empty() {
        Column::new().push(text("No activity yet").size(12))
    } else {
        state
            .history
            .iter()
            .rev()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry.clone()).size(12))
            })
    };

    let map_column = column![
        row![category_row(state.home.category(), Message::CategoryPicked), locate]
            .spacing(12)
            .align_y(Alignment::Center),
        canvas,
        status,
        Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
    ]
    .spacing(10)
    .width(Length::Fill);

    let mut layout = Row::new().spacing(16).push(map_column);
    if state.detail.id.is_some() {
        layout = layout.push(detail_panel(state, &state.detail));
    }
    layout.into()
}

fn detail_panel<'a>(state: &'a MapView, panel: &'a DetailPanel) -> Element<'a, Message> {
    let mut content = Column::new().spacing(8);
    let title = panel
        .detail
        .as_ref()
        .map(|d| d.summary.name.clone())
        .or_else(|| {
            panel
                .id
                .and_then(|id| state.home.restaurant(id))
                .map(|r| r.name.clone())
        })
        .unwrap_or_default();
    content = content.push(
        row![
            text(title).size(22).width(Length::Fill),
            button(text("닫기").size(12)).on_press(Message::ClosePanel).padding(4),
        ]
        .align_y(Alignment::Center),
    );
    if let Some(line) = notice(&panel.error, panel.loading) {
        content = content.push(line);
    }

    if let Some(detail) = &panel.detail {
        let summary = &detail.summary;
        content = content
            .push(text(format!("{} · {}", summary.category, summary.address)).size(13))
            .push(text(summary.phone.clone().unwrap_or_else(|| "전화번호 없음".into())).size(13))
            .push(
                text(format!(
                    "{} 평균 {:.1}점 · 리뷰 {} · 방문 {}",
                    score_badge(summary.avg_score),
                    summary.avg_score,
                    summary.review_count,
                    summary.visit_count
                ))
                .size(14),
            );
        let badges = summary.badges();
        if !badges.is_empty() {
            content = content.push(text(badges.join(" · ")).size(12));
        }
        if !detail.menus.is_empty() {
            content = content
                .push(text("메뉴").size(16))
                .push(text(detail.menus.join(", ")).size(13));
        }
        if !detail.one_line_comment.is_empty() {
            content = content.push(text(format!("AI 한줄평: {}", detail.one_line_comment)).size(13));
        }
        let visit_label = if panel.visiting { "기록 중..." } else { "방문했어요" };
        content = content.push(
            button(text(visit_label).size(14))
                .on_press_maybe((!panel.visiting).then_some(Message::RecordVisit))
                .padding(6),
        );
    }

    let ratings = RATING_OPTIONS.iter().fold(Row::new().spacing(4), |row, option| {
        row.push(choice(
            format!("{} {}", option.emoji, option.label),
            panel.draft.score == option.value,
            Message::ScorePicked(option.value),
        ))
    });
    let picked = rating_option(panel.draft.score)
        .map(|option| option.description)
        .unwrap_or("별점을 선택해주세요");
    let submit_label = if panel.submitting { "등록 중..." } else { "리뷰 등록" };
    content = content
        .push(text("리뷰 작성").size(16))
        .push(ratings)
        .push(text(picked).size(12))
        .push(
            text_input("5자 이상 작성해주세요", &panel.draft.comment)
                .on_input(Message::CommentEdited)
                .on_submit(Message::SubmitReview)
                .padding(6),
        )
        .push(
            row![
                text(format!(
                    "{}/{}",
                    panel.draft.comment.trim().chars().count(),
                    MAX_COMMENT_CHARS
                ))
                .size(12),
                button(text(submit_label).size(14))
                    .on_press_maybe(
                        (panel.draft.is_submittable() && !panel.submitting)
                            .then_some(Message::SubmitReview)
                    )
                    .padding(6),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );
    if let Some(error) = &panel.form_error {
        content = content.push(text(error.clone()).size(13));
    }

    let reviews = if panel.reviews.is_empty() {
        Column::new().push(text("아직 리뷰가 없습니다").size(12))
    } else {
        panel.reviews.iter().fold(Column::new().spacing(6), |col, review| {
            let emoji = rating_option(review.score).map_or("", |o| o.emoji);
            col.push(
                column![
                    text(format!("{} {}", review.reviewer, emoji)).size(13),
                    text(review.comment.clone()).size(13),
                    text(format_timestamp(&review.created_at, &Local)).size(11),
                ]
                .spacing(2),
            )
        })
    };
    content = content
        .push(text(format!("리뷰 {}개", panel.reviews.len())).size(16))
        .push(reviews);

    Container::new(scrollable(content))
        .width(Length::Fixed(360.0))
        .height(Length::Fill)
        .padding(8)
        .into()
}

fn rankings_page(state: &MapView) -> Element<'_, Message> {
    let periods = RankingPeriod::ALL.into_iter().fold(Row::new().spacing(6), |row, period| {
        row.push(choice(
            period.label(),
            state.ranking_period == period,
            Message::RankingPeriodPicked(period),
        ))
    });
    let mut content = column![
        text("방문 랭킹").size(26),
        periods,
        category_row(state.rankings.category, Message::RankingCategoryPicked),
    ]
    .spacing(10);
    if let Some(line) = notice(&state.rankings.error, state.rankings.loading) {
        content = content.push(line);
    } else if state.rankings.entries.is_empty() {
        content = content.push(text("아직 방문 기록이 없습니다").size(14));
    }
    let list = state
        .rankings
        .entries
        .iter()
        .enumerate()
        .fold(Column::new().spacing(6), |col, (index, entry)| {
            col.push(
                row![
                    text(format!("{}위", index + 1)).size(16).width(Length::Fixed(48.0)),
                    text(format!(
                        "{} ({}) · 방문 {}회",
                        entry.summary.name, entry.summary.category, entry.period_visit_count
                    ))
                    .size(14)
                    .width(Length::Fill),
                    show_on_map(&entry.summary),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
        });
    content.push(scrollable(list).height(Length::Fill)).into()
}

fn guide_page(state: &MapView) -> Element<'_, Message> {
    let mut content = column![
        text("아슐랭 가이드").size(26),
        category_row(state.guide.category, Message::GuideCategoryPicked),
    ]
    .spacing(10);
    if let Some(line) = notice(&state.guide.error, state.guide.loading) {
        content = content.push(line);
    }
    let list = state.guide.entries.iter().fold(Column::new().spacing(6), |col, restaurant| {
        let score = restaurant
            .restaurant_score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "-".into());
        col.push(
            row![
                text(format!(
                    "{} {} ({}) · 아슐랭 점수 {}",
                    score_badge(restaurant.avg_score),
                    restaurant.name,
                    restaurant.category,
                    score
                ))
                .size(14)
                .width(Length::Fill),
                show_on_map(restaurant),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
    });
    content.push(scrollable(list).height(Length::Fill)).into()
}

fn recommend_page(state: &MapView) -> Element<'_, Message> {
    let page = &state.recommend;
    let presets = EXAMPLE_SITUATIONS
        .into_iter()
        .fold(Column::new().spacing(4), |col, situation| {
            col.push(
                button(text(situation).size(12))
                    .on_press(Message::SituationPreset(situation))
                    .padding(4)
                    .style(button::text),
            )
        });
    let submit_label = if page.loading { "추천 받는 중..." } else { "추천 받기" };
    let mut content = column![
        text("메뉴 추천").size(26),
        text_input("어떤 상황인가요?", &page.situation)
            .on_input(Message::SituationEdited)
            .on_submit(Message::SubmitRecommendation)
            .padding(6),
        text("예시 상황").size(14),
        presets,
        category_row(page.category, Message::RecommendCategoryPicked),
        button(text(submit_label).size(14))
            .on_press_maybe((!page.loading).then_some(Message::SubmitRecommendation))
            .padding(8),
    ]
    .spacing(10);
    if let Some(error) = &page.error {
        content = content.push(text(error.clone()).size(14));
    }
    if page.searched && page.results.is_empty() && page.error.is_none() {
        content = content.push(text("추천할 식당을 찾지 못했습니다").size(14));
    }
    let results = page.results.iter().fold(Column::new().spacing(8), |col, pick| {
        col.push(
            row![
                column![
                    text(format!("{} ({})", pick.summary.name, pick.summary.category)).size(16),
                    text(pick.recommendation_reason.clone()).size(13),
                    text(format!("이번 달 방문 {}회", pick.monthly_visits)).size(12),
                ]
                .spacing(2)
                .width(Length::Fill),
                show_on_map(&pick.summary),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
    });
    content.push(scrollable(results).height(Length::Fill)).into()
}

fn my_page(state: &MapView) -> Element<'_, Message> {
    let my = &state.my;
    let Some(user) = state.session.user() else {
        let mut content = column![
            text("마이페이지").size(26),
            text("Google 인증 코드로 로그인하세요").size(14),
            text_input("인증 코드", &my.auth_code)
                .on_input(Message::AuthCodeEdited)
                .on_submit(Message::Login)
                .padding(6),
            button(text(if my.busy { "로그인 중..." } else { "로그인" }).size(14))
                .on_press_maybe((!my.busy).then_some(Message::Login))
                .padding(8),
        ]
        .spacing(10)
        .width(Length::Fixed(420.0));
        if let Some(error) = &my.error {
            content = content.push(text(error.clone()).size(14));
        }
        return content.into();
    };

    let tabs = row![
        choice("내 리뷰", my.tab == MyTab::Reviews, Message::MyTabPicked(MyTab::Reviews)),
        choice("방문 기록", my.tab == MyTab::Visits, Message::MyTabPicked(MyTab::Visits)),
    ]
    .spacing(6);

    let mut content = column![
        row![
            text(format!("{}님", user.user_name)).size(26).width(Length::Fill),
            button(text("로그아웃").size(14))
                .on_press_maybe((!my.busy).then_some(Message::Logout))
                .padding(6),
        ]
        .align_y(Alignment::Center),
        tabs,
    ]
    .spacing(10);
    if let Some(line) = notice(&my.error, my.loading) {
        content = content.push(line);
    }

    let (list, pages) = match my.tab {
        MyTab::Reviews => (
            my_reviews(state),
            my.reviews.as_ref().map(|r| (r.current_page, r.total_pages)),
        ),
        MyTab::Visits => (
            my_visits(state),
            my.visits.as_ref().map(|v| (v.current_page, v.total_pages)),
        ),
    };
    let (current, total) = pages.unwrap_or((1, 0));
    let current = current.max(1);
    content = content.push(scrollable(list).height(Length::Fill));
    if total > 1 {
        let pages = page_window(current, total)
            .into_iter()
            .fold(Row::new().spacing(4), |row, page| {
                row.push(choice(page.to_string(), page == current, Message::MyPageTurned(page)))
            });
        content = content.push(pages);
    }
    content.into()
}

fn my_reviews(state: &MapView) -> Element<'_, Message> {
    let Some(response) = &state.my.reviews else {
        return Column::new().into();
    };
    if response.reviews.is_empty() {
        return text("작성한 리뷰가 없습니다").size(14).into();
    }
    response
        .reviews
        .iter()
        .fold(Column::new().spacing(8), |col, review| {
            let restaurant = state.my.cache.get(review.restaurant_id);
            let name = restaurant.map_or_else(|| format!("식당 #{}", review.restaurant_id), |r| r.name.clone());
            let emoji = rating_option(review.score).map_or("", |o| o.emoji);
            let mut entry = column![
                text(format!("{name} {emoji}")).size(15),
                text(review.comment.clone()).size(13),
                text(format_timestamp(&review.created_at, &Local)).size(11),
            ]
            .spacing(2);
            if let Some(restaurant) = restaurant {
                entry = entry.push(show_on_map(restaurant));
            }
            col.push(entry)
        })
        .into()
}

fn my_visits(state: &MapView) -> Element<'_, Message> {
    let Some(response) = &state.my.visits else {
        return Column::new().into();
    };
    if response.visits.is_empty() {
        return text("방문 기록이 없습니다").size(14).into();
    }
    let today = Local::now().date_naive();
    group_by_day(&response.visits, &Local, today)
        .into_iter()
        .fold(Column::new().spacing(10), |col, day| {
            let entries = day.visits.iter().fold(Column::new().spacing(4), |col, visit| {
                let time = parse_timestamp(&visit.created_at, &Local)
                    .map(|at| time_label(&at))
                    .unwrap_or_default();
                col.push(
                    text(format!(
                        "{time}  {} ({}) · {}",
                        visit.restaurant_name.as_deref().unwrap_or("알 수 없는 식당"),
                        visit.restaurant_category.as_deref().unwrap_or("-"),
                        visit.restaurant_address.as_deref().unwrap_or("")
                    ))
                    .size(13),
                )
            });
            col.push(column![text(day.label).size(16), entries].spacing(4))
        })
        .into()
}
