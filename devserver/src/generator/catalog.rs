use hankkicore::model::Category;

pub const NAME_PREFIXES: [&str; 8] = [
    "아주", "원천", "광교", "월드컵", "영통", "매탄", "우만", "팔달",
];

pub const STREETS: [&str; 4] = ["월드컵로", "원천로", "중부대로", "아주로"];

/// Name suffixes and menu items per category.
pub fn catalog(category: Category) -> (&'static [&'static str], &'static [&'static str]) {
    match category {
        Category::Korean => (
            &["백반", "국밥", "한정식", "찌개마을"],
            &["김치찌개", "된장찌개", "제육볶음", "순두부찌개", "불고기 정식"],
        ),
        Category::Chinese => (
            &["반점", "각", "차이나", "홍콩"],
            &["짜장면", "짬뽕", "탕수육", "마파두부"],
        ),
        Category::Japanese => (
            &["스시", "라멘", "돈카츠", "이자카야 식당"],
            &["초밥 세트", "돈코츠 라멘", "로스카츠", "규동"],
        ),
        Category::Western => (
            &["키친", "비스트로", "파스타", "그릴"],
            &["토마토 파스타", "스테이크", "리조또", "수제 피자"],
        ),
        Category::Snack => (
            &["분식", "김밥", "떡볶이", "포차"],
            &["떡볶이", "김밥", "라볶이", "튀김"],
        ),
        Category::Asian => (
            &["포", "타이", "쌀국수", "커리"],
            &["쌀국수", "팟타이", "분짜", "치킨 커리"],
        ),
        Category::FastFood => (
            &["버거", "치킨", "샌드위치", "핫도그"],
            &["치즈버거", "후라이드 치킨", "감자튀김", "클럽 샌드위치"],
        ),
        Category::Cafe => (
            &["커피", "베이커리", "디저트 카페", "로스터스"],
            &["아메리카노", "카페 라떼", "치즈케이크", "크루아상"],
        ),
        Category::Pub => (
            &["포차", "호프", "이자카야", "술집"],
            &["모둠 꼬치", "치킨", "골뱅이 무침", "감바스"],
        ),
    }
}

pub const COMMENTS: [&str; 5] = [
    "학생들이 자주 찾는 가성비 맛집",
    "양이 푸짐하고 회전이 빨라요",
    "조용해서 혼밥하기 좋아요",
    "시험 기간에 늦게까지 열어요",
    "단체 모임하기 좋은 넓은 자리",
];

pub const REVIEW_LINES: [&str; 6] = [
    "가격 대비 정말 만족스러워요",
    "맛은 괜찮은데 조금 기다렸어요",
    "친구들이랑 또 오고 싶어요",
    "사장님이 친절하세요",
    "양이 조금 아쉬웠어요",
    "메뉴가 다양해서 좋아요",
];

pub const FIXTURE_USERS: [(&str, &str); 5] = [
    ("student01", "김아주"),
    ("student02", "이원천"),
    ("student03", "박광교"),
    ("student04", "최영통"),
    ("student05", "정매탄"),
];
